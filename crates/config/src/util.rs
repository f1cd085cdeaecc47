use std::fs;
use std::io;
use std::path::Path;

/// Writes `data` to a `<file name>.tmp` sibling, then renames it over `path`.  
/// 先寫入同目錄的 `.tmp` 檔再改名覆蓋，避免讀到寫到一半的檔案。
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)
}
