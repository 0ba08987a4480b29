//! dwmock のコア機能
//!
//! このクレートは、DWARF索引から関数シグネチャとモック用ヘッダを生成します。
//! 関数が使用するtypedefの依存グラフ構築、宣言順へのトポロジカルソート、
//! C言語テキストの生成を行います。

pub mod config;
pub mod errors;
pub mod graph;
pub mod toposort;
pub mod generator;
pub mod header;

pub use config::GeneratorConfig;
pub use errors::GenerateError;
pub use graph::TypedefGraph;
pub use toposort::linearize;
pub use generator::CodeGenerator;
pub use header::HeaderGenerator;

// 他のクレートから使用するために再エクスポート
pub use dwmock_dwarf::{DebugInfoIndex, DwarfError, TypeResolver};

/// 生成処理の結果型
pub type Result<T> = std::result::Result<T, GenerateError>;
