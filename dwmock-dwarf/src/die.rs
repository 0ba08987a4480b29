//! DIE（Debugging Information Entry）ツリーのモデル
//!
//! gimliのDIEを、索引構築に必要な属性だけを持つタグ付きの値に変換したものです。
//! 未知のタグは [`DieKind::Other`] として保持し、子要素の走査だけを継続します。

use crate::DwarfError;
use std::fmt;

/// DIEの識別子（`.debug_info` セクション先頭からのオフセット）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DieId(pub usize);

impl fmt::Display for DieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<0x{:x}>", self.0)
    }
}

impl From<gimli::DebugInfoOffset<usize>> for DieId {
    fn from(offset: gimli::DebugInfoOffset<usize>) -> Self {
        DieId(offset.0)
    }
}

/// 関数宣言（DW_TAG_subprogram）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprogramDie {
    pub name: String,
    /// 戻り値の型。`None` は void
    pub return_type: Option<DieId>,
    /// DW_AT_declaration を持つ（定義を伴わない宣言）
    pub declaration: bool,
}

/// 基本型（DW_TAG_base_type）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTypeDie {
    pub name: String,
}

/// typedef（DW_TAG_typedef）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDie {
    pub name: String,
    /// 一段階だけ参照する型
    pub target: DieId,
}

/// 仮引数（DW_TAG_formal_parameter）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDie {
    pub name: String,
    pub type_ref: DieId,
}

/// DIEの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DieKind {
    Subprogram(SubprogramDie),
    BaseType(BaseTypeDie),
    Typedef(TypedefDie),
    FormalParameter(ParameterDie),
    /// 索引の対象外（compile_unit、構造体、ポインタ型など）
    Other(gimli::DwTag),
}

impl DieKind {
    /// 表示用のタグ名
    pub fn tag_name(&self) -> String {
        match self {
            DieKind::Subprogram(_) => "DW_TAG_subprogram".to_string(),
            DieKind::BaseType(_) => "DW_TAG_base_type".to_string(),
            DieKind::Typedef(_) => "DW_TAG_typedef".to_string(),
            DieKind::FormalParameter(_) => "DW_TAG_formal_parameter".to_string(),
            DieKind::Other(tag) => tag.to_string(),
        }
    }
}

/// DIEツリーのノード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die {
    pub id: DieId,
    pub kind: DieKind,
    pub children: Vec<Die>,
}

impl Die {
    /// 子を持たないDIEを作成する
    pub fn new(id: DieId, kind: DieKind) -> Self {
        Self {
            id,
            kind,
            children: Vec::new(),
        }
    }

    /// 子を追加する（ビルダー形式）
    pub fn with_children(mut self, children: Vec<Die>) -> Self {
        self.children = children;
        self
    }

    pub fn as_subprogram(&self) -> Result<&SubprogramDie, DwarfError> {
        match &self.kind {
            DieKind::Subprogram(subprogram) => Ok(subprogram),
            other => Err(self.mismatch("DW_TAG_subprogram", other)),
        }
    }

    pub fn as_base_type(&self) -> Result<&BaseTypeDie, DwarfError> {
        match &self.kind {
            DieKind::BaseType(base) => Ok(base),
            other => Err(self.mismatch("DW_TAG_base_type", other)),
        }
    }

    pub fn as_typedef(&self) -> Result<&TypedefDie, DwarfError> {
        match &self.kind {
            DieKind::Typedef(typedef) => Ok(typedef),
            other => Err(self.mismatch("DW_TAG_typedef", other)),
        }
    }

    pub fn as_formal_parameter(&self) -> Result<&ParameterDie, DwarfError> {
        match &self.kind {
            DieKind::FormalParameter(param) => Ok(param),
            other => Err(self.mismatch("DW_TAG_formal_parameter", other)),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &DieKind) -> DwarfError {
        DwarfError::TagMismatch {
            id: self.id,
            expected,
            found: found.tag_name(),
        }
    }
}
