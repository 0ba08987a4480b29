//! typedef依存グラフの構築
//!
//! 関数シグネチャ（戻り値・引数）に現れる型名を起点に、typedefの参照をたどって
//! 宣言が必要なtypedefをすべて集め、「typedef -> 直接参照する型」の辺を記録します。

use crate::Result;
use dwmock_dwarf::{FunctionEntry, TypeResolver};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// typedef依存グラフ
///
/// ノードは関数シグネチャから到達可能なtypedef名で、各ノードは直接参照する型名の集合を持ちます。
/// 参照先が基本型の場合、その名前はノードにはならず葉として残ります。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedefGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl TypedefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 関数群のシグネチャで使われる型名から依存グラフを構築する
    pub fn from_functions<'f, I>(resolver: &TypeResolver<'_>, functions: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'f FunctionEntry>,
    {
        let mut seeds = Vec::new();
        for function in functions {
            if let Some(return_type) = function.return_type {
                seeds.push(resolver.name_of(return_type)?);
            }
            for param in &function.params {
                seeds.push(resolver.name_of(param.type_ref)?);
            }
        }

        Self::from_type_names(resolver, seeds)
    }

    /// 型名の集合を起点に依存グラフを構築する
    ///
    /// ワークリストからtypedef名を取り出し、直接の参照先を辺として記録し、
    /// 参照先が未訪問のtypedefであればワークリストに積みます。
    pub fn from_type_names<'n, I>(resolver: &TypeResolver<'_>, type_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut graph = Self::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut worklist: Vec<String> = Vec::new();

        for name in type_names {
            if resolver.is_typedef_name(name) && visited.insert(name.to_string()) {
                worklist.push(name.to_string());
            }
        }

        while let Some(typedef) = worklist.pop() {
            let referenced = resolver.referenced_name_of(&typedef)?;
            debug!("typedef '{}' depends on '{}'", typedef, referenced);

            if resolver.is_typedef_name(referenced) && visited.insert(referenced.to_string()) {
                worklist.push(referenced.to_string());
            }
            graph.add_edge(typedef, referenced);
        }

        Ok(graph)
    }

    /// 「`typedef` は `depends_on` に依存する」辺を追加する
    pub fn add_edge(&mut self, typedef: impl Into<String>, depends_on: impl Into<String>) {
        self.edges
            .entry(typedef.into())
            .or_default()
            .insert(depends_on.into());
    }

    pub fn contains(&self, typedef: &str) -> bool {
        self.edges.contains_key(typedef)
    }

    /// 直接の依存先
    pub fn dependencies(&self, typedef: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(typedef)
    }

    /// ノード（typedef名）を名前順に列挙する
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
