//! 生成処理のエラー型

use dwmock_dwarf::DwarfError;

/// ヘッダ生成で発生するエラー
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// typedefの依存関係が循環しており、宣言順を決められない
    #[error("Cyclic typedef dependency among: {}", .0.join(", "))]
    CyclicTypedefs(Vec<String>),

    /// 索引の参照解決に失敗した
    #[error(transparent)]
    Dwarf(#[from] DwarfError),
}
