// ==========================================
// im2txt 图像描述模型 - 数据路径解析
// ==========================================
// 职责: 环境相关的数据根目录与设置文件位置
// 红线: 仅在进程启动加载时读取环境变量，构造默认配置时不得调用
// ==========================================

use std::path::{Path, PathBuf};

/// 数据根目录（环境变量）
pub const DATA_ROOT_ENV: &str = "IM2TXT_DATA_ROOT";

/// 设置文件路径（环境变量）
pub const CONFIG_PATH_ENV: &str = "IM2TXT_CONFIG_PATH";

/// 默认数据根目录
pub const DEFAULT_DATA_ROOT: &str = "/home/ubuntu/research/data";

/// 泛化启发式文件相对数据根目录的路径
pub const HEURISTIC_FILE_RELATIVE: &str = "glove/heuristic/heuristic.300d.70000w.20k.txt";

/// 词向量目录相对数据根目录的路径（保留末尾 `/`）
pub const EMBEDDING_DIR_RELATIVE: &str = "glove/embeddings/";

/// 默认泛化启发式文件（= DEFAULT_DATA_ROOT + HEURISTIC_FILE_RELATIVE）
pub const DEFAULT_HEURISTIC_FILE: &str =
    "/home/ubuntu/research/data/glove/heuristic/heuristic.300d.70000w.20k.txt";

/// 默认词向量目录（= DEFAULT_DATA_ROOT + EMBEDDING_DIR_RELATIVE）
pub const DEFAULT_EMBEDDING_DIR: &str = "/home/ubuntu/research/data/glove/embeddings/";

/// 用户配置目录下的子目录与文件名
const SETTINGS_DIR_NAME: &str = "im2txt";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// 拼接数据根目录与相对路径，输出字符串形式
fn join_under(root: &Path, relative: &str) -> String {
    let mut joined = root.join(relative).to_string_lossy().into_owned();
    if relative.ends_with('/') && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// 指定数据根目录下的泛化启发式文件路径
pub fn heuristic_file_under(root: &Path) -> String {
    join_under(root, HEURISTIC_FILE_RELATIVE)
}

/// 指定数据根目录下的词向量目录（末尾带 `/`）
pub fn embedding_dir_under(root: &Path) -> String {
    join_under(root, EMBEDDING_DIR_RELATIVE)
}

/// 读取非空环境变量（去除首尾空白）
fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 从环境变量读取数据根目录
pub fn data_root_from_env() -> Option<PathBuf> {
    non_empty_env(DATA_ROOT_ENV).map(PathBuf::from)
}

/// 从环境变量读取设置文件路径
pub fn settings_file_from_env() -> Option<PathBuf> {
    non_empty_env(CONFIG_PATH_ENV).map(PathBuf::from)
}

/// 默认设置文件位置: `<用户配置目录>/im2txt/settings.json`
///
/// 无法获取用户配置目录时返回 None
pub fn default_settings_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}
