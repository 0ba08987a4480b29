//! ELFとDWARFの読み込み機能

use crate::{DwarfError, Result};
use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::debug;

type Slice = gimli::EndianSlice<'static, gimli::RunTimeEndian>;

/// 再配置を適用しながらDWARFセクションを読むリーダー型
pub type DwarfReader = gimli::RelocateReader<Slice, &'static SectionRelocations>;

/// セクションごとの再配置表
///
/// 再配置可能オブジェクト（`gcc -c` の出力）では `.debug_info` 中の
/// `.debug_str` オフセットなどが再配置で埋められるため、読み取り時に適用します。
/// リンク済みの実行ファイルでは空になります。
#[derive(Debug, Default)]
pub struct SectionRelocations(object::read::RelocationMap);

impl gimli::read::Relocate for &SectionRelocations {
    fn relocate_address(&self, offset: usize, value: u64) -> gimli::Result<u64> {
        Ok(self.0.relocate(offset as u64, value))
    }

    fn relocate_offset(&self, offset: usize, value: usize) -> gimli::Result<usize> {
        <usize as gimli::ReaderOffset>::from_u64(self.0.relocate(offset as u64, value as u64))
    }
}

/// DWARFローダー
pub struct DwarfLoader {
    /// DWARFコンテキスト
    dwarf: gimli::Dwarf<DwarfReader>,
}

impl DwarfLoader {
    /// ELFファイルからDWARF情報を読み込む
    ///
    /// `.debug_info` セクションが存在しない、または空の場合は
    /// [`DwarfError::MissingDebugInfo`] を返します。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file_data = fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file {:?}: {}", path, e))?;

        Self::parse(path, file_data)
    }

    /// メモリ上のオブジェクトファイルからDWARF情報を読み込む
    pub fn parse<P: AsRef<Path>>(path: P, file_data: Vec<u8>) -> Result<Self> {
        let path = path.as_ref();

        // DIEツリーはプロセス終了まで参照されるため'staticライフタイムで保持する
        let file_data: &'static [u8] = Box::leak(file_data.into_boxed_slice());

        let object_file = object::File::parse(file_data)
            .map_err(|e| anyhow::anyhow!("Failed to parse ELF file {:?}: {}", path, e))?;

        let has_debug_info = object_file
            .section_by_name(".debug_info")
            .map(|section| section.size() > 0)
            .unwrap_or(false);
        if !has_debug_info {
            return Err(DwarfError::MissingDebugInfo(path.to_path_buf()).into());
        }

        let endian = if object_file.is_little_endian() {
            gimli::RunTimeEndian::Little
        } else {
            gimli::RunTimeEndian::Big
        };

        let load_section = |id: gimli::SectionId| -> Result<DwarfReader> {
            let (data, relocations) = match object_file.section_by_name(id.name()) {
                Some(section) => {
                    let data = match section.uncompressed_data().map_err(|e| {
                        anyhow::anyhow!("Failed to read section {}: {}", id.name(), e)
                    })? {
                        Cow::Borrowed(data) => data,
                        Cow::Owned(data) => &*Box::leak(data.into_boxed_slice()),
                    };
                    let relocations = section.relocation_map().map_err(|e| {
                        anyhow::anyhow!("Failed to read relocations for {}: {}", id.name(), e)
                    })?;
                    (data, relocations)
                }
                None => (&[][..], object::read::RelocationMap::default()),
            };

            let relocations: &'static SectionRelocations =
                Box::leak(Box::new(SectionRelocations(relocations)));
            Ok(gimli::RelocateReader::new(
                gimli::EndianSlice::new(data, endian),
                relocations,
            ))
        };

        let dwarf = gimli::Dwarf::load(load_section)
            .map_err(|e| anyhow::anyhow!("Failed to load DWARF sections: {}", e))?;

        debug!(
            "Loaded DWARF sections from {:?} ({:?} endian, {:?})",
            path,
            endian,
            object_file.kind()
        );

        Ok(Self { dwarf })
    }

    /// DWARFコンテキストへの参照を取得
    pub fn dwarf(&self) -> &gimli::Dwarf<DwarfReader> {
        &self.dwarf
    }
}
