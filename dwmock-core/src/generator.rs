//! C言語の宣言テキスト生成

use crate::{GeneratorConfig, Result};
use dwmock_dwarf::{DebugInfoIndex, DwarfError, FunctionEntry, TypeResolver};

/// 宣言テキストの生成器
pub struct CodeGenerator<'a> {
    index: &'a DebugInfoIndex,
    resolver: TypeResolver<'a>,
    config: &'a GeneratorConfig,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(index: &'a DebugInfoIndex, config: &'a GeneratorConfig) -> Self {
        Self {
            index,
            resolver: TypeResolver::new(index),
            config,
        }
    }

    /// `typedef <参照先> <名前>;`
    pub fn typedef_text(&self, name: &str) -> Result<String> {
        let referenced = self.resolver.referenced_name_of(name)?;
        Ok(format!("typedef {} {};", referenced, name))
    }

    /// `<戻り値型> <関数名>(<型 引数名>, ...);`
    pub fn function_text(&self, name: &str) -> Result<String> {
        let function = self.function(name)?;
        let return_type = self.resolver.return_type_name(function)?;

        let params = function
            .params
            .iter()
            .map(|param| {
                let type_name = self.resolver.name_of(param.type_ref)?;
                Ok(format!("{} {}", type_name, param.name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(format!("{} {}({});", return_type, name, argument_list(&params)))
    }

    /// 引数チェックの有無を表す列挙型
    pub fn mock_enum_text(&self) -> String {
        format!(
            "enum {} {{\n    {},\n    {}\n}};",
            self.config.enum_name, self.config.ignore_enumerator, self.config.check_enumerator
        )
    }

    /// `mock_<関数名>_param<番号>`
    pub fn mock_param_struct_name(&self, function_name: &str, param_index: usize) -> String {
        format!("{}{}_param{}", self.config.mock_prefix, function_name, param_index)
    }

    /// 期待値と検査フラグを持つ引数チェック用の構造体
    pub fn mock_param_struct_text(
        &self,
        function_name: &str,
        param_index: usize,
        param_type: &str,
    ) -> String {
        format!(
            "struct {} {{\n    {} value;\n    enum {} mock_param;\n}};",
            self.mock_param_struct_name(function_name, param_index),
            param_type,
            self.config.enum_name
        )
    }

    /// モック関数のプロトタイプ
    ///
    /// 元の引数ごとに引数チェック用の構造体を受け取り、最後にモックが返す値を受け取ります。
    /// 戻り値が void の場合、戻り値の引数は付きません。
    pub fn mock_prototype_text(
        &self,
        function_name: &str,
        return_type: &str,
        param_struct_names: &[String],
    ) -> String {
        let mut args: Vec<String> = param_struct_names
            .iter()
            .enumerate()
            .map(|(index, struct_name)| format!("struct {} param{}", struct_name, index))
            .collect();
        if return_type != "void" {
            args.push(format!("{} {}", return_type, self.config.return_value_name));
        }

        format!(
            "{} {}{}({});",
            return_type,
            self.config.mock_prefix,
            function_name,
            argument_list(&args)
        )
    }

    /// 関数ごとの引数チェック構造体をすべて生成する
    pub fn mock_param_structs(&self, function: &FunctionEntry) -> Result<Vec<String>> {
        function
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let type_name = self.resolver.name_of(param.type_ref)?;
                Ok(self.mock_param_struct_text(&function.name, index, type_name))
            })
            .collect()
    }

    /// 関数のモックプロトタイプを生成する
    pub fn mock_prototype(&self, function: &FunctionEntry) -> Result<String> {
        let return_type = self.resolver.return_type_name(function)?;
        let struct_names: Vec<String> = (0..function.params.len())
            .map(|index| self.mock_param_struct_name(&function.name, index))
            .collect();
        Ok(self.mock_prototype_text(&function.name, return_type, &struct_names))
    }

    fn function(&self, name: &str) -> Result<&'a FunctionEntry> {
        self.index
            .function(name)
            .ok_or_else(|| DwarfError::UnknownFunction(name.to_string()).into())
    }
}

/// 引数がない場合は `()` ではなく `(void)` とする（Cでは `()` は引数未指定の意味）
fn argument_list(args: &[String]) -> String {
    if args.is_empty() {
        "void".to_string()
    } else {
        args.join(", ")
    }
}
