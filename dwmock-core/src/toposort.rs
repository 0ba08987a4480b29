//! typedef宣言順の決定（トポロジカルソート）

use crate::{GenerateError, Result, TypedefGraph};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// 依存グラフを宣言可能な順序に並べる
///
/// Kahnのアルゴリズムで、参照先のtypedefが必ず参照元より前に来る順序を返します。
/// 同時に宣言可能なtypedefは名前順に取り出すため、同じ入力には常に同じ順序を返します。
/// 出力はグラフのノード（typedef名）だけで、基本型の葉は含みません。
///
/// 循環がある場合は、順序を決められなかったtypedefを添えて
/// [`GenerateError::CyclicTypedefs`] を返します。
pub fn linearize(graph: &TypedefGraph) -> Result<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = graph.nodes().map(|node| (node, 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for node in graph.nodes() {
        for dependency in graph.dependencies(node).into_iter().flatten() {
            // 基本型への辺は順序の制約にならない
            if !graph.contains(dependency) {
                continue;
            }
            dependents.entry(dependency.as_str()).or_default().push(node);
            if let Some(degree) = in_degree.get_mut(node) {
                *degree += 1;
            }
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(node, _)| *node)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node.to_string());
        for &dependent in dependents.get(node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if order.len() < graph.len() {
        let mut remaining: Vec<String> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(node, _)| node.to_string())
            .collect();
        remaining.sort();
        return Err(GenerateError::CyclicTypedefs(remaining));
    }

    debug!("Linearized {} typedefs", order.len());
    Ok(order)
}
