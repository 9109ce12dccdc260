use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

/// Fixed UI strings for one language.
#[derive(Debug)]
pub struct Translations {
    pub title: &'static str,
    pub status_init: &'static str,
    pub status_user_detected: &'static str,
    pub status_user_away: &'static str,
    pub status_time_up: &'static str,
    pub status_paused: &'static str,
}

const EN: Translations = Translations {
    title: "L.I.S.A.",
    status_init: "Waiting for pose detector...",
    status_user_detected: "User Detected. Sitting:",
    status_user_away: "User Away. Timer Paused:",
    status_time_up: "⚠️ TIME UP!",
    status_paused: "(paused)",
};

const ZH: Translations = Translations {
    title: "L.I.S.A.",
    status_init: "正在等待姿态检测...",
    status_user_detected: "检测到用户。久坐时长:",
    status_user_away: "用户离开。计时器暂停:",
    status_time_up: "⚠️ 时间到!",
    status_paused: "(已暂停)",
};

impl Language {
    pub fn translations(&self) -> &'static Translations {
        match self {
            Language::En => &EN,
            Language::Zh => &ZH,
        }
    }

    /// BCP 47 tag handed to the speech synthesizer.
    pub fn speech_tag(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Zh => "zh-CN",
        }
    }

    pub fn wire_code(&self) -> u8 {
        match self {
            Language::En => 0,
            Language::Zh => 1,
        }
    }

    pub fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Language::En),
            1 => Some(Language::Zh),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Zh => write!(f, "zh"),
        }
    }
}
