//! ヘッダ全体の生成
//!
//! 索引 → 依存グラフ → 宣言順 → テキストの順に処理します。
//! 途中でエラーが起きた場合は何も出力せずにエラーを返します。

use crate::{linearize, CodeGenerator, GeneratorConfig, Result, TypedefGraph};
use dwmock_dwarf::{DebugInfoIndex, TypeResolver};
use tracing::{debug, warn};

/// ヘッダ生成器
pub struct HeaderGenerator<'a> {
    index: &'a DebugInfoIndex,
    generator: CodeGenerator<'a>,
    config: &'a GeneratorConfig,
}

impl<'a> HeaderGenerator<'a> {
    pub fn new(index: &'a DebugInfoIndex, config: &'a GeneratorConfig) -> Self {
        Self {
            index,
            generator: CodeGenerator::new(index, config),
            config,
        }
    }

    /// 関数シグネチャから到達可能なtypedefを宣言順に返す
    pub fn typedef_order(&self) -> Result<Vec<String>> {
        let resolver = TypeResolver::new(self.index);
        let graph = TypedefGraph::from_functions(&resolver, self.index.functions())?;

        let conflicts = resolver.conflicting_typedefs();
        for name in graph.nodes() {
            if let Some(targets) = conflicts.get(name) {
                warn!(
                    "typedef '{}' has conflicting definitions ({}), using the last one",
                    name,
                    targets.join(", ")
                );
            }
        }

        let order = linearize(&graph)?;
        debug!("typedef order: {:?}", order);
        Ok(order)
    }

    /// typedef宣言を宣言順に生成する
    pub fn typedef_declarations(&self) -> Result<Vec<String>> {
        self.typedef_order()?
            .iter()
            .map(|name| self.generator.typedef_text(name))
            .collect()
    }

    /// 関数プロトタイプを索引の挿入順に生成する
    pub fn function_prototypes(&self) -> Result<Vec<String>> {
        self.index
            .functions()
            .map(|function| self.generator.function_text(&function.name))
            .collect()
    }

    /// typedef宣言と関数プロトタイプを改行区切りで出力する
    pub fn prototypes(&self) -> Result<String> {
        let mut lines = self.typedef_declarations()?;
        lines.extend(self.function_prototypes()?);
        Ok(join_lines(&lines))
    }

    /// モック用ヘッダを生成する
    ///
    /// `#pragma once`、typedef宣言、引数チェック用の列挙型、
    /// 引数ごとの構造体、モック関数のプロトタイプの順に出力します。
    pub fn mock_header(&self) -> Result<String> {
        let mut sections: Vec<String> = Vec::new();

        if self.config.pragma_once {
            sections.push("#pragma once".to_string());
        }

        let typedefs = self.typedef_declarations()?;
        if !typedefs.is_empty() {
            sections.push(typedefs.join("\n"));
        }

        sections.push(self.generator.mock_enum_text());

        let mut prototypes = Vec::new();
        for function in self.index.functions() {
            sections.extend(self.generator.mock_param_structs(function)?);
            prototypes.push(self.generator.mock_prototype(function)?);
        }
        if !prototypes.is_empty() {
            sections.push(prototypes.join("\n"));
        }

        Ok(format!("{}\n", sections.join("\n\n")))
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
