//! DWARF索引のエラー型

use crate::DieId;
use std::path::PathBuf;

/// 索引構築・型解決で発生するエラー
#[derive(Debug, thiserror::Error)]
pub enum DwarfError {
    /// 入力ファイルにDWARF情報が埋め込まれていない
    #[error("File has no DWARF info: {}", .0.display())]
    MissingDebugInfo(PathBuf),

    /// 型IDが基本型にもtypedefにも見つからない
    #[error("Unknown type: no base type or typedef at {0}")]
    UnknownType(DieId),

    /// typedef名が索引に存在しない
    #[error("Unknown typedef: {0}")]
    UnknownTypedef(String),

    /// 関数名が索引に存在しない
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// 仮引数の親となる関数が存在しない
    #[error("Formal parameter '{name}' at {id} has no enclosing function")]
    OrphanParameter { name: String, id: DieId },

    /// 型付きアクセサで期待したタグと一致しない
    #[error("Expected {expected} at {id}, found {found}")]
    TagMismatch {
        id: DieId,
        expected: &'static str,
        found: String,
    },
}
