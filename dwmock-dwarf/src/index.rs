//! デバッグ情報の索引
//!
//! DIEツリーを一度だけ深さ優先で走査し、基本型・typedef・関数の3つの表に分類します。
//! 仮引数は直近の祖先にある関数へ宣言順に追加されます。

use crate::die::{BaseTypeDie, Die, DieId, DieKind, ParameterDie, SubprogramDie, TypedefDie};
use crate::{DieTreeReader, DwarfError, DwarfLoader};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// 基本型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub id: DieId,
    pub name: String,
}

/// typedef
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefEntry {
    pub id: DieId,
    pub name: String,
    /// 参照先の型ID（基本型または別のtypedef）
    pub target: DieId,
}

/// 仮引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    pub name: String,
    pub type_ref: DieId,
}

/// 関数シグネチャ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: String,
    /// 戻り値の型。`None` は void
    pub return_type: Option<DieId>,
    /// 宣言順の仮引数
    pub params: Vec<ParamEntry>,
}

/// 走査中に子へ引き継ぐ関数コンテキスト
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    /// 関数の外側
    Root,
    /// 名前付き関数の内側
    Function(&'a str),
    /// 索引に載せない関数の内側（引数は捨てる）
    Hidden,
}

/// DWARF索引
#[derive(Debug, Default)]
pub struct DebugInfoIndex {
    types: HashMap<DieId, TypeEntry>,
    typedefs: HashMap<DieId, TypedefEntry>,
    /// 挿入順を保持する関数の表
    functions: Vec<FunctionEntry>,
    function_slots: HashMap<String, usize>,
    type_names: HashMap<String, DieId>,
    typedef_names: HashMap<String, DieId>,
}

impl DebugInfoIndex {
    /// ELFファイルを読み込み、索引を構築する
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let loader = DwarfLoader::load(path)?;
        let roots = DieTreeReader::new(&loader).read_units()?;
        let index = Self::build(&roots)?;

        info!(
            "Indexed {:?}: {} base types, {} typedefs, {} functions",
            path,
            index.types.len(),
            index.typedefs.len(),
            index.functions.len()
        );
        Ok(index)
    }

    /// DIEツリーから索引を構築する
    pub fn build(roots: &[Die]) -> Result<Self, DwarfError> {
        let mut index = Self::default();
        for root in roots {
            index.visit(root, Scope::Root)?;
        }
        Ok(index)
    }

    /// DIEを処理してから子を訪問する
    fn visit<'d>(&mut self, die: &'d Die, scope: Scope<'d>) -> Result<(), DwarfError> {
        let scope = match &die.kind {
            DieKind::Subprogram(subprogram) => self.record_function(die.id, subprogram),
            DieKind::BaseType(base) => {
                self.record_type(die.id, base);
                scope
            }
            DieKind::Typedef(typedef) => {
                self.record_typedef(die.id, typedef);
                scope
            }
            DieKind::FormalParameter(param) => {
                self.record_param(die.id, param, scope)?;
                scope
            }
            // 名前を解決できなかった関数の引数を外側の関数に混ぜない
            DieKind::Other(gimli::DW_TAG_subprogram) => Scope::Hidden,
            DieKind::Other(_) => scope,
        };

        for child in &die.children {
            self.visit(child, scope)?;
        }
        Ok(())
    }

    fn record_function<'d>(&mut self, id: DieId, subprogram: &'d SubprogramDie) -> Scope<'d> {
        let entry = FunctionEntry {
            name: subprogram.name.clone(),
            return_type: subprogram.return_type,
            params: Vec::new(),
        };

        match self.function_slots.get(&subprogram.name) {
            Some(_) if subprogram.declaration => {
                debug!("Skipping declaration of already indexed '{}' at {}", subprogram.name, id);
                return Scope::Hidden;
            }
            Some(&slot) => {
                debug!("Replacing function '{}' with entry at {}", subprogram.name, id);
                self.functions[slot] = entry;
            }
            None => {
                self.function_slots
                    .insert(subprogram.name.clone(), self.functions.len());
                self.functions.push(entry);
            }
        }

        Scope::Function(&subprogram.name)
    }

    fn record_type(&mut self, id: DieId, base: &BaseTypeDie) {
        self.types.insert(
            id,
            TypeEntry {
                id,
                name: base.name.clone(),
            },
        );
        self.type_names.insert(base.name.clone(), id);
    }

    fn record_typedef(&mut self, id: DieId, typedef: &TypedefDie) {
        self.typedefs.insert(
            id,
            TypedefEntry {
                id,
                name: typedef.name.clone(),
                target: typedef.target,
            },
        );
        if let Some(previous) = self.typedef_names.insert(typedef.name.clone(), id) {
            if previous != id {
                debug!("Typedef '{}' redeclared at {} (was {})", typedef.name, id, previous);
            }
        }
    }

    fn record_param(
        &mut self,
        id: DieId,
        param: &ParameterDie,
        scope: Scope<'_>,
    ) -> Result<(), DwarfError> {
        let function = match scope {
            Scope::Function(function) => function,
            Scope::Hidden => return Ok(()),
            Scope::Root => {
                return Err(DwarfError::OrphanParameter {
                    name: param.name.clone(),
                    id,
                })
            }
        };

        let slot = *self
            .function_slots
            .get(function)
            .ok_or_else(|| DwarfError::UnknownFunction(function.to_string()))?;
        self.functions[slot].params.push(ParamEntry {
            name: param.name.clone(),
            type_ref: param.type_ref,
        });
        Ok(())
    }

    /// 基本型を取得する
    pub fn type_entry(&self, id: DieId) -> Option<&TypeEntry> {
        self.types.get(&id)
    }

    /// typedefを取得する
    pub fn typedef_entry(&self, id: DieId) -> Option<&TypedefEntry> {
        self.typedefs.get(&id)
    }

    /// 基本型名からIDを引く
    pub fn type_id(&self, name: &str) -> Option<DieId> {
        self.type_names.get(name).copied()
    }

    /// typedef名からIDを引く
    pub fn typedef_id(&self, name: &str) -> Option<DieId> {
        self.typedef_names.get(name).copied()
    }

    /// すべてのtypedef
    pub fn typedefs(&self) -> impl Iterator<Item = &TypedefEntry> {
        self.typedefs.values()
    }

    /// 関数を挿入順に列挙する
    pub fn functions(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.functions.iter()
    }

    /// 関数名から関数を取得する
    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.function_slots.get(name).map(|&slot| &self.functions[slot])
    }

    /// 条件に一致する関数だけを残す（順序は保持する）
    pub fn retain_functions<F>(&mut self, mut keep: F)
    where
        F: FnMut(&FunctionEntry) -> bool,
    {
        self.functions.retain(|function| keep(function));
        self.function_slots = self
            .functions
            .iter()
            .enumerate()
            .map(|(slot, function)| (function.name.clone(), slot))
            .collect();
    }

    /// 索引済みの関数の数
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}
