//! gimliのDIEツリーを [`Die`] ツリーに変換する

use crate::die::{BaseTypeDie, Die, DieId, DieKind, ParameterDie, SubprogramDie, TypedefDie};
use crate::loader::DwarfReader;
use crate::{DwarfLoader, Result};
use gimli::Reader;
use tracing::debug;

type Unit = gimli::Unit<DwarfReader>;
type Entry<'abbrev, 'unit> = gimli::DebuggingInformationEntry<'abbrev, 'unit, DwarfReader>;

/// DIEツリーリーダー
pub struct DieTreeReader<'a> {
    dwarf: &'a gimli::Dwarf<DwarfReader>,
}

impl<'a> DieTreeReader<'a> {
    /// DWARFローダーからリーダーを作成する
    pub fn new(loader: &'a DwarfLoader) -> Self {
        Self {
            dwarf: loader.dwarf(),
        }
    }

    /// すべてのコンパイルユニットを読み込み、ユニットごとのルートDIEを返す
    pub fn read_units(&self) -> Result<Vec<Die>> {
        let mut roots = Vec::new();

        let mut iter = self.dwarf.units();
        while let Some(header) = iter.next()? {
            let unit = self.dwarf.unit(header)?;
            let mut tree = unit.entries_tree(None)?;
            let root = tree.root()?;
            roots.push(self.read_node(&unit, root)?);
        }

        debug!("Read {} compilation units", roots.len());
        Ok(roots)
    }

    /// ノードとその子孫を再帰的に変換する
    fn read_node(
        &self,
        unit: &Unit,
        node: gimli::EntriesTreeNode<'_, '_, '_, DwarfReader>,
    ) -> Result<Die> {
        let entry = node.entry();
        let id = die_id(unit, entry.offset())?;
        let kind = self.classify(unit, entry, id)?;

        let mut children = Vec::new();
        let mut iter = node.children();
        while let Some(child) = iter.next()? {
            children.push(self.read_node(unit, child)?);
        }

        Ok(Die { id, kind, children })
    }

    /// DIEを種類ごとに分類する
    ///
    /// 索引対象のタグでも必須属性が欠けている場合（サブルーチン型の無名引数、
    /// インライン展開された引数、`typedef void` など）は `Other` として扱います。
    fn classify(&self, unit: &Unit, entry: &Entry<'_, '_>, id: DieId) -> Result<DieKind> {
        let tag = entry.tag();

        let kind = match tag {
            gimli::DW_TAG_subprogram => match self.name(unit, entry)? {
                Some(name) => Some(DieKind::Subprogram(SubprogramDie {
                    name,
                    return_type: type_ref(unit, entry)?,
                    declaration: is_declaration(entry)?,
                })),
                None => None,
            },
            gimli::DW_TAG_base_type => self
                .name(unit, entry)?
                .map(|name| DieKind::BaseType(BaseTypeDie { name })),
            gimli::DW_TAG_typedef => match (self.name(unit, entry)?, type_ref(unit, entry)?) {
                (Some(name), Some(target)) => Some(DieKind::Typedef(TypedefDie { name, target })),
                _ => None,
            },
            gimli::DW_TAG_formal_parameter => {
                match (self.name(unit, entry)?, type_ref(unit, entry)?) {
                    (Some(name), Some(type_ref)) => {
                        Some(DieKind::FormalParameter(ParameterDie { name, type_ref }))
                    }
                    _ => None,
                }
            }
            _ => return Ok(DieKind::Other(tag)),
        };

        Ok(kind.unwrap_or_else(|| {
            debug!("{} at {} lacks name or type, not indexed", tag, id);
            DieKind::Other(tag)
        }))
    }

    /// DW_AT_name を取得する（.debug_str / .debug_line_str 参照も解決する）
    fn name(&self, unit: &Unit, entry: &Entry<'_, '_>) -> Result<Option<String>> {
        match entry.attr_value(gimli::DW_AT_name)? {
            Some(value) => {
                let name = self.dwarf.attr_string(unit, value)?;
                Ok(Some(name.to_string_lossy()?.into_owned()))
            }
            None => Ok(None),
        }
    }
}

/// ユニット内オフセットを `.debug_info` 全体でのIDに変換する
fn die_id(unit: &Unit, offset: gimli::UnitOffset<usize>) -> Result<DieId> {
    offset
        .to_debug_info_offset(&unit.header)
        .map(DieId::from)
        .ok_or_else(|| anyhow::anyhow!("Type units are not supported (offset 0x{:x})", offset.0))
}

/// DW_AT_type の参照先IDを取得する
fn type_ref(unit: &Unit, entry: &Entry<'_, '_>) -> Result<Option<DieId>> {
    match entry.attr_value(gimli::DW_AT_type)? {
        Some(gimli::AttributeValue::UnitRef(offset)) => Ok(Some(die_id(unit, offset)?)),
        Some(gimli::AttributeValue::DebugInfoRef(offset)) => Ok(Some(DieId::from(offset))),
        Some(other) => Err(anyhow::anyhow!(
            "Unsupported DW_AT_type form {:?} at {}",
            other,
            die_id(unit, entry.offset())?
        )),
        None => Ok(None),
    }
}

/// DW_AT_declaration フラグを取得する
fn is_declaration(entry: &Entry<'_, '_>) -> Result<bool> {
    match entry.attr_value(gimli::DW_AT_declaration)? {
        Some(gimli::AttributeValue::Flag(flag)) => Ok(flag),
        _ => Ok(false),
    }
}
