//! dwmock DWARF デバッグ情報解析
//!
//! このクレートは、ELFファイルに埋め込まれたDWARF情報から関数シグネチャと
//! 型情報（基本型・typedef）を抽出する機能を提供します。
//! DIEツリーの読み込み、索引の構築、型IDから型名への解決を行います。

pub mod loader;
pub mod die;
pub mod reader;
pub mod index;
pub mod resolver;
pub mod error;

pub use loader::{DwarfLoader, DwarfReader, SectionRelocations};
pub use die::{BaseTypeDie, Die, DieId, DieKind, ParameterDie, SubprogramDie, TypedefDie};
pub use reader::DieTreeReader;
pub use index::{DebugInfoIndex, FunctionEntry, ParamEntry, TypeEntry, TypedefEntry};
pub use resolver::TypeResolver;
pub use error::DwarfError;

/// DWARF読み込みの結果型
pub type Result<T> = anyhow::Result<T>;
