//! Infrastructure layer
//!
//! Domain 層が定義する trait の具体的な実装を提供します。
//!
//! - `registry`: インメモリのメンバーレジストリ
//! - `dispatcher`: ブロードキャストキューとディスパッチャ
//! - `transport`: WebSocket を使った接続ハンドル
//! - `dto`: HTTP レスポンス用の DTO

pub mod dispatcher;
pub mod dto;
pub mod registry;
pub mod transport;
