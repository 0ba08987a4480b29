//! 生成設定

/// 生成設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// モック用の構造体名・関数名に付ける接頭辞
    pub mock_prefix: String,
    /// 引数チェック用の列挙型の名前
    pub enum_name: String,
    /// 引数を検査しないことを示す列挙子
    pub ignore_enumerator: String,
    /// 引数を検査することを示す列挙子
    pub check_enumerator: String,
    /// モック関数に渡す戻り値の引数名
    pub return_value_name: String,
    /// ヘッダ先頭に `#pragma once` を出力する
    pub pragma_once: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mock_prefix: "mock_".to_string(),
            enum_name: "mock_param_e".to_string(),
            ignore_enumerator: "MOCK_PARAM_IGNORE".to_string(),
            check_enumerator: "MOCK_PARAM_CHECK".to_string(),
            return_value_name: "ret_value".to_string(),
            pragma_once: true,
        }
    }
}
