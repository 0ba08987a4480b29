//! 型IDから型名への解決

use crate::{DebugInfoIndex, DieId, DwarfError, FunctionEntry};
use std::collections::BTreeMap;

/// 型解決器
///
/// 索引を読み取るだけで、状態を持ちません。
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    index: &'a DebugInfoIndex,
}

impl<'a> TypeResolver<'a> {
    pub fn new(index: &'a DebugInfoIndex) -> Self {
        Self { index }
    }

    /// 型IDの表示名を取得する
    ///
    /// typedefの場合はtypedef自身の名前を返し、参照先はたどりません。
    pub fn name_of(&self, id: DieId) -> Result<&'a str, DwarfError> {
        if let Some(entry) = self.index.type_entry(id) {
            return Ok(&entry.name);
        }
        if let Some(entry) = self.index.typedef_entry(id) {
            return Ok(&entry.name);
        }
        Err(DwarfError::UnknownType(id))
    }

    /// 戻り値の型名を取得する（型を持たない関数は void）
    pub fn return_type_name(&self, function: &FunctionEntry) -> Result<&'a str, DwarfError> {
        match function.return_type {
            Some(id) => self.name_of(id),
            None => Ok("void"),
        }
    }

    pub fn is_typedef_name(&self, name: &str) -> bool {
        self.index.typedef_id(name).is_some()
    }

    pub fn is_type_name(&self, name: &str) -> bool {
        self.index.type_id(name).is_some()
    }

    /// typedefが直接参照する型の名前を取得する
    ///
    /// 参照先が別のtypedefであれば、そのtypedefの名前が返ります。
    pub fn referenced_name_of(&self, typedef_name: &str) -> Result<&'a str, DwarfError> {
        let id = self
            .index
            .typedef_id(typedef_name)
            .ok_or_else(|| DwarfError::UnknownTypedef(typedef_name.to_string()))?;
        let entry = self
            .index
            .typedef_entry(id)
            .ok_or_else(|| DwarfError::UnknownTypedef(typedef_name.to_string()))?;
        self.name_of(entry.target)
    }

    /// 同名で異なる型を参照するtypedefを列挙する
    ///
    /// 名前による解決ではこれらを区別できず、最後に登録されたものが使われます。
    /// 戻り値は typedef名 -> 参照先の型名の一覧（名前順）です。
    pub fn conflicting_typedefs(&self) -> BTreeMap<&'a str, Vec<&'a str>> {
        let mut targets: BTreeMap<&'a str, Vec<&'a str>> = BTreeMap::new();
        for entry in self.index.typedefs() {
            let target = self.name_of(entry.target).unwrap_or("<unresolved>");
            let seen = targets.entry(entry.name.as_str()).or_default();
            if !seen.contains(&target) {
                seen.push(target);
            }
        }

        targets.retain(|_, seen| seen.len() > 1);
        for seen in targets.values_mut() {
            seen.sort_unstable();
        }
        targets
    }
}
