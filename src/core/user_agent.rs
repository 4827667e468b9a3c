// LogSift - core/user_agent.rs
//
// Substring-based user-agent classification into browser / OS / device
// class. Pure function, no allocation beyond the returned strings.

use crate::core::model::DeviceInfo;
use crate::util::constants::UNKNOWN;

/// Browser markers, first match wins. Chrome is checked first, so Edge and
/// Opera (which advertise Chrome) classify as Chrome.
fn detect_browser(ua: &str) -> &'static str {
    if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Firefox") {
        "Firefox"
    } else if ua.contains("Safari") {
        "Safari"
    } else if ua.contains("Edge") || ua.contains("Edg") {
        "Edge"
    } else if ua.contains("MSIE") || ua.contains("Trident") {
        "Internet Explorer"
    } else {
        UNKNOWN
    }
}

/// OS markers, first match wins.
///
/// Apple mobile agents carry `like Mac OS X`, so their markers are checked
/// before `Mac OS`. Android agents carry `Linux` and report as Linux.
fn detect_os(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
        "iOS"
    } else if ua.contains("Mac OS") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else if ua.contains("Android") {
        "Android"
    } else {
        UNKNOWN
    }
}

/// Device class, first match wins; anything unrecognised is a desktop.
fn detect_device(ua: &str) -> &'static str {
    if ua.contains("Mobile") || ua.contains("Android") || ua.contains("iPhone") {
        "Mobile"
    } else if ua.contains("iPad") || ua.contains("Tablet") {
        "Tablet"
    } else {
        "Desktop"
    }
}

/// Classify a raw user-agent string.
///
/// Returns `None` for an absent or empty string; otherwise always returns a
/// best-effort guess with `"Unknown"` for unrecognised browser or OS.
pub fn classify(user_agent: Option<&str>) -> Option<DeviceInfo> {
    let ua = user_agent.filter(|ua| !ua.is_empty())?;
    Some(DeviceInfo {
        browser: detect_browser(ua).to_string(),
        os: detect_os(ua).to_string(),
        device: detect_device(ua).to_string(),
        extra: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 13_2 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
    const IE11: &str = "Mozilla/5.0 (Windows NT 10.0; Trident/7.0; rv:11.0) like Gecko";

    fn classify_str(ua: &str) -> DeviceInfo {
        classify(Some(ua)).unwrap()
    }

    #[test]
    fn test_absent_or_empty_returns_none() {
        assert_eq!(classify(None), None);
        assert_eq!(classify(Some("")), None);
    }

    #[test]
    fn test_iphone_safari_is_mobile_ios() {
        let info = classify_str(SAFARI_IPHONE);
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iOS");
        assert_eq!(info.device, "Mobile");
    }

    #[test]
    fn test_ipad_is_tablet() {
        let info = classify_str(SAFARI_IPAD);
        assert_eq!(info.os, "iOS");
        assert_eq!(info.device, "Tablet");
    }

    #[test]
    fn test_chrome_on_windows_desktop() {
        let info = classify_str(CHROME_WINDOWS);
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");
        assert_eq!(info.device, "Desktop");
    }

    #[test]
    fn test_firefox_on_linux() {
        let info = classify_str(FIREFOX_LINUX);
        assert_eq!(info.browser, "Firefox");
        assert_eq!(info.os, "Linux");
        assert_eq!(info.device, "Desktop");
    }

    #[test]
    fn test_android_chrome_is_mobile_linux() {
        let info = classify_str(CHROME_ANDROID);
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Linux");
        assert_eq!(info.device, "Mobile");
    }

    #[test]
    fn test_android_without_linux_token() {
        let info = classify_str("Dalvik/2.1.0 (Android 13; Pixel 7)");
        assert_eq!(info.os, "Android");
        assert_eq!(info.device, "Mobile");
    }

    #[test]
    fn test_safari_on_mac() {
        let info = classify_str(SAFARI_MAC);
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "macOS");
    }

    #[test]
    fn test_internet_explorer() {
        assert_eq!(classify_str(IE11).browser, "Internet Explorer");
    }

    #[test]
    fn test_legacy_edge_without_chrome_token() {
        let info = classify_str("Mozilla/5.0 (Windows NT 10.0) Edge/18.19041");
        assert_eq!(info.browser, "Edge");
    }

    #[test]
    fn test_unrecognised_string_defaults() {
        let info = classify_str("curl/8.4.0");
        assert_eq!(info.browser, "Unknown");
        assert_eq!(info.os, "Unknown");
        assert_eq!(info.device, "Desktop");
    }

    #[test]
    fn test_classification_is_total_over_odd_inputs() {
        let browsers = ["Chrome", "Firefox", "Safari", "Edge", "Internet Explorer", "Unknown"];
        let systems = ["Windows", "macOS", "Linux", "Android", "iOS", "Unknown"];
        let devices = ["Mobile", "Tablet", "Desktop"];
        for ua in [" ", "\u{0}", "ÄÖÜ", "Mobile Tablet", "iOS", "\"quoted\""] {
            let info = classify_str(ua);
            assert!(browsers.contains(&info.browser.as_str()), "{ua:?}");
            assert!(systems.contains(&info.os.as_str()), "{ua:?}");
            assert!(devices.contains(&info.device.as_str()), "{ua:?}");
        }
    }
}
