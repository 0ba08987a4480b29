//! gimli::write と object::write で実際のDWARFを持つELFを組み立てるテスト用ヘルパー
//!
//! 生成されるDWARFは次のCソースに相当します（2つのコンパイルユニット）。
//!
//! ```c
//! /* unit 0 */
//! typedef uint32_t u32_t;
//! typedef u32_t handle_t;
//! typedef void (*callback_t)(int);   /* 無名引数を持つサブルーチン型 */
//! int close_handle(handle_t h, int flags);
//! int close_handle(handle_t ignored); /* 宣言のみ */
//!
//! /* unit 1 */
//! handle_t open_handle(uint32_t path_len);
//! void noop(void);
//! ```

#![allow(dead_code)]

use gimli::write::{
    AttributeValue, Dwarf, EndianVec, LineProgram, Reference, Sections, Unit, UnitEntryId,
    UnitId, Writer,
};
use gimli::{Encoding, Format, LittleEndian, SectionId};
use object::write::{Object, Relocation};
use object::{
    Architecture, BinaryFormat, Endianness, RelocationEncoding, RelocationFlags, RelocationKind,
    SectionKind,
};

/// `.debug_str` へのオフセットを再配置として書き出すライター
///
/// 再配置可能オブジェクトと同様に、セクションデータには0を書き込み、
/// 実際のオフセットは再配置のアドエンドとして記録します。
#[derive(Clone)]
struct ObjectWriter {
    data: EndianVec<LittleEndian>,
    relocate_strings: bool,
    /// (セクション内オフセット, `.debug_str` 内オフセット)
    str_relocations: Vec<(usize, usize)>,
}

impl ObjectWriter {
    fn new(relocate_strings: bool) -> Self {
        Self {
            data: EndianVec::new(LittleEndian),
            relocate_strings,
            str_relocations: Vec::new(),
        }
    }
}

impl Writer for ObjectWriter {
    type Endian = LittleEndian;

    fn endian(&self) -> LittleEndian {
        LittleEndian
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn write(&mut self, bytes: &[u8]) -> gimli::write::Result<()> {
        self.data.write(bytes)
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> gimli::write::Result<()> {
        self.data.write_at(offset, bytes)
    }

    fn write_offset(
        &mut self,
        val: usize,
        section: SectionId,
        size: u8,
    ) -> gimli::write::Result<()> {
        if self.relocate_strings && section == SectionId::DebugStr {
            self.str_relocations.push((self.data.len(), val));
            return self.data.write_udata(0, size);
        }
        self.data.write_udata(val as u64, size)
    }
}

fn set_name(unit: &mut Unit, entry: UnitEntryId, name: AttributeValue) {
    unit.get_mut(entry).set(gimli::DW_AT_name, name);
}

fn add_entry(unit: &mut Unit, parent: UnitEntryId, tag: gimli::DwTag) -> UnitEntryId {
    unit.add(parent, tag)
}

fn inline_name(name: &str) -> AttributeValue {
    AttributeValue::String(name.as_bytes().to_vec())
}

/// 上記のCソースに相当するDWARFを組み立てる
fn build_dwarf() -> Dwarf {
    let encoding = Encoding {
        format: Format::Dwarf32,
        version: 4,
        address_size: 8,
    };
    let mut dwarf = Dwarf::new();
    let first: UnitId = dwarf.units.add(Unit::new(encoding, LineProgram::none()));
    let second: UnitId = dwarf.units.add(Unit::new(encoding, LineProgram::none()));

    let uint32_name = AttributeValue::StringRef(dwarf.strings.add("uint32_t"));
    let u32_t_name = AttributeValue::StringRef(dwarf.strings.add("u32_t"));
    let handle_t_name = AttributeValue::StringRef(dwarf.strings.add("handle_t"));
    let close_name = AttributeValue::StringRef(dwarf.strings.add("close_handle"));
    let h_name = AttributeValue::StringRef(dwarf.strings.add("h"));
    let open_name = AttributeValue::StringRef(dwarf.strings.add("open_handle"));
    let path_len_name = AttributeValue::StringRef(dwarf.strings.add("path_len"));

    // unit 0
    let (uint32, handle_t) = {
        let unit = dwarf.units.get_mut(first);
        let root = unit.root();

        let int = add_entry(unit, root, gimli::DW_TAG_base_type);
        set_name(unit, int, inline_name("int"));

        let uint32 = add_entry(unit, root, gimli::DW_TAG_base_type);
        set_name(unit, uint32, uint32_name);

        // 参照元のtypedefを先に置く
        let handle_t = add_entry(unit, root, gimli::DW_TAG_typedef);
        let u32_t = add_entry(unit, root, gimli::DW_TAG_typedef);
        set_name(unit, u32_t, u32_t_name);
        unit.get_mut(u32_t)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(uint32));
        set_name(unit, handle_t, handle_t_name);
        unit.get_mut(handle_t)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(u32_t));

        let callback = add_entry(unit, root, gimli::DW_TAG_subroutine_type);
        let unnamed = add_entry(unit, callback, gimli::DW_TAG_formal_parameter);
        unit.get_mut(unnamed)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(int));
        let callback_t = add_entry(unit, root, gimli::DW_TAG_typedef);
        set_name(unit, callback_t, inline_name("callback_t"));

        let close = add_entry(unit, root, gimli::DW_TAG_subprogram);
        set_name(unit, close, close_name.clone());
        unit.get_mut(close)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(int));
        let h = add_entry(unit, close, gimli::DW_TAG_formal_parameter);
        set_name(unit, h, h_name);
        unit.get_mut(h)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(handle_t));
        let flags = add_entry(unit, close, gimli::DW_TAG_formal_parameter);
        set_name(unit, flags, inline_name("flags"));
        unit.get_mut(flags)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(int));

        let declared = add_entry(unit, root, gimli::DW_TAG_subprogram);
        set_name(unit, declared, close_name);
        unit.get_mut(declared)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(int));
        unit.get_mut(declared)
            .set(gimli::DW_AT_declaration, AttributeValue::FlagPresent);
        let ignored = add_entry(unit, declared, gimli::DW_TAG_formal_parameter);
        set_name(unit, ignored, inline_name("ignored"));
        unit.get_mut(ignored)
            .set(gimli::DW_AT_type, AttributeValue::UnitRef(handle_t));

        (uint32, handle_t)
    };

    // unit 1: 型はすべてunit 0を .debug_info オフセットで参照する
    {
        let unit = dwarf.units.get_mut(second);
        let root = unit.root();

        let open = add_entry(unit, root, gimli::DW_TAG_subprogram);
        set_name(unit, open, open_name);
        unit.get_mut(open).set(
            gimli::DW_AT_type,
            AttributeValue::DebugInfoRef(Reference::Entry(first, handle_t)),
        );
        let path_len = add_entry(unit, open, gimli::DW_TAG_formal_parameter);
        set_name(unit, path_len, path_len_name);
        unit.get_mut(path_len).set(
            gimli::DW_AT_type,
            AttributeValue::DebugInfoRef(Reference::Entry(first, uint32)),
        );

        let noop = add_entry(unit, root, gimli::DW_TAG_subprogram);
        set_name(unit, noop, inline_name("noop"));
    }

    dwarf
}

/// DWARFセクションをELF再配置可能オブジェクトに格納する
///
/// `relocate_strings` が真のとき、`.debug_info` 中の `.debug_str` オフセットは
/// RELA再配置（R_X86_64_32）としてのみ記録されます。
pub fn relocatable_elf(relocate_strings: bool) -> Vec<u8> {
    let mut dwarf = build_dwarf();
    let mut sections = Sections::new(ObjectWriter::new(relocate_strings));
    dwarf.write(&mut sections).expect("write DWARF");

    let mut written = Vec::new();
    sections
        .for_each(|id, writer| {
            if !writer.data.slice().is_empty() {
                written.push((id, writer.data.slice().to_vec(), writer.str_relocations.clone()));
            }
            Ok::<(), std::convert::Infallible>(())
        })
        .expect("collect sections");

    let mut object = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let mut section_ids = Vec::new();
    for (id, data, _) in &written {
        let section = object.add_section(Vec::new(), id.name().as_bytes().to_vec(), SectionKind::Debug);
        object.set_section_data(section, data.clone(), 1);
        section_ids.push((*id, section));
    }

    let debug_str = section_ids
        .iter()
        .find(|(id, _)| *id == SectionId::DebugStr)
        .map(|(_, section)| *section);

    for ((_, _, relocations), (_, section)) in written.iter().zip(&section_ids) {
        if relocations.is_empty() {
            continue;
        }
        let symbol = object.section_symbol(debug_str.expect(".debug_str section"));
        for &(offset, addend) in relocations {
            object
                .add_relocation(
                    *section,
                    Relocation {
                        offset: offset as u64,
                        symbol,
                        addend: addend as i64,
                        flags: RelocationFlags::Generic {
                            kind: RelocationKind::Absolute,
                            encoding: RelocationEncoding::Generic,
                            size: 32,
                        },
                    },
                )
                .expect("add relocation");
        }
    }

    object.write().expect("write ELF")
}
