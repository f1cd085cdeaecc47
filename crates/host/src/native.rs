//! Native (C/C++) debugger settings and debugger-flavor transitions.
//! 原生專案的偵錯設定與偵錯器類型轉換。

use serde::{Deserialize, Serialize};

/// Debugger the native toolchain launches with.  
/// 原生工具鏈使用的偵錯器類型。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuggerFlavor {
    #[default]
    Local,
    Remote,
    WebBrowser,
    WebService,
}

impl DebuggerFlavor {
    /// Next flavor after applying the given overrides.  
    /// 套用覆寫值後的偵錯器類型。
    ///
    /// A non-empty browser URL always selects [`DebuggerFlavor::WebBrowser`],
    /// then an enabled remote flag selects [`DebuggerFlavor::Remote`]. Explicitly
    /// switching off the current mode (remote `false`, empty URL) falls back to
    /// [`DebuggerFlavor::Local`]; anything else keeps the current flavor.
    pub fn transition(self, browser_url: Option<&str>, remote: Option<bool>) -> Self {
        if matches!(browser_url, Some(url) if !url.is_empty()) {
            return DebuggerFlavor::WebBrowser;
        }
        if remote == Some(true) {
            return DebuggerFlavor::Remote;
        }
        let leave_remote = remote == Some(false) && self == DebuggerFlavor::Remote;
        let leave_browser = browser_url == Some("") && self == DebuggerFlavor::WebBrowser;
        if leave_remote || leave_browser {
            DebuggerFlavor::Local
        } else {
            self
        }
    }
}

/// Explicit field set of a native project's debugger settings.  
/// 原生專案偵錯設定的欄位。
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeDebugSettings {
    /// External command; empty means "start the project output".
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub command_arguments: String,
    #[serde(default)]
    pub working_directory: String,
    #[serde(default)]
    pub remote_machine: String,
    #[serde(default)]
    pub browser_url: String,
    #[serde(default)]
    pub flavor: DebuggerFlavor,
}

#[cfg(test)]
mod tests {
    use super::DebuggerFlavor::*;
    use super::*;

    #[test]
    fn browser_url_wins_over_remote() {
        assert_eq!(Local.transition(Some("http://x"), Some(true)), WebBrowser);
        assert_eq!(Remote.transition(Some("http://x"), None), WebBrowser);
    }

    #[test]
    fn remote_flag_switches_between_local_and_remote() {
        assert_eq!(Local.transition(None, Some(true)), Remote);
        assert_eq!(Remote.transition(None, Some(false)), Local);
        assert_eq!(WebService.transition(None, Some(false)), WebService);
    }

    #[test]
    fn empty_url_leaves_browser_mode() {
        assert_eq!(WebBrowser.transition(Some(""), None), Local);
        assert_eq!(Remote.transition(Some(""), None), Remote);
    }

    #[test]
    fn unmanaged_inputs_keep_flavor() {
        for flavor in [Local, Remote, WebBrowser, WebService] {
            assert_eq!(flavor.transition(None, None), flavor);
        }
    }

    #[test]
    fn transitions_are_idempotent() {
        let inputs = [
            (None, None),
            (Some("http://x"), None),
            (Some(""), Some(false)),
            (None, Some(true)),
        ];
        for flavor in [Local, Remote, WebBrowser, WebService] {
            for (url, remote) in inputs {
                let once = flavor.transition(url, remote);
                assert_eq!(once.transition(url, remote), once);
            }
        }
    }
}
