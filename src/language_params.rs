/*!
 * Per-language training parameters.
 *
 * A static table maps a language code to the fonts to render with, the DAWG
 * sizing factors, text-filter flags and the script properties (direction,
 * normalisation mode) that later phases need. The pipeline only talks to the
 * table through [`LanguageResolver`], so callers can plug in their own.
 */

use log::debug;

use crate::errors::PipelineError;

/// Fonts rendered top-to-bottom during image generation
pub const VERTICAL_FONTS: &[&str] = &[
    "TakaoExGothic",
    "TakaoExMincho",
    "AR PL UKai Patched",
    "AR PL UMing Patched Light",
    "Baekmuk Batang Patched",
];

const LATIN_FONTS: &[&str] = &[
    "Arial Bold",
    "Arial Bold Italic",
    "Arial Italic",
    "Arial",
    "Courier New Bold",
    "Courier New Bold Italic",
    "Courier New Italic",
    "Courier New",
    "Times New Roman, Bold",
    "Times New Roman, Bold Italic",
    "Times New Roman, Italic",
    "Times New Roman,",
    "Georgia Bold",
    "Georgia Italic",
    "Georgia",
    "Georgia Bold Italic",
    "Trebuchet MS Bold",
    "Trebuchet MS Bold Italic",
    "Trebuchet MS Italic",
    "Trebuchet MS",
    "Verdana Bold",
    "Verdana Italic",
    "Verdana",
    "Verdana Bold Italic",
    "DejaVu Sans Ultra-Light",
];

const FRAKTUR_FONTS: &[&str] = &[
    "CaslonishFraxx Medium",
    "Cloister Black, Light",
    "Proclamate Light",
    "UnifrakturMaguntia",
    "Walbaum-Fraktur",
];

const RUSSIAN_FONTS: &[&str] = &[
    "Arial Bold",
    "Arial Italic",
    "Arial",
    "Courier New Bold",
    "Courier New",
    "Times New Roman, Bold",
    "Times New Roman, Italic",
    "Times New Roman,",
    "DejaVu Serif",
    "DejaVu Sans",
];

const GREEK_FONTS: &[&str] = &[
    "Arial Unicode MS",
    "Arial Unicode MS Bold",
    "DejaVu Sans Mono",
    "DejaVu Serif",
    "DejaVu Serif Bold",
    "FreeSerif Bold",
    "FreeSerif",
];

const ARABIC_FONTS: &[&str] = &[
    "Arabic Transparent Bold",
    "Arabic Transparent",
    "Arial Unicode MS Bold",
    "Arial Unicode MS",
    "Simplified Arabic Bold",
    "Simplified Arabic",
    "Traditional Arabic Bold",
    "Traditional Arabic",
];

const PERSIAN_FONTS: &[&str] = &[
    "Amiri Bold Italic",
    "Amiri Bold",
    "Amiri Italic",
    "Amiri",
    "Lateef",
    "Scheherazade",
];

const HEBREW_FONTS: &[&str] = &[
    "Arial Bold",
    "Arial",
    "Courier New Bold",
    "Courier New",
    "Ergo Hebrew Semi-Bold",
    "Ergo Hebrew",
    "Ezra SIL",
    "Frank Ruehl CLM",
];

const DEVANAGARI_FONTS: &[&str] = &[
    "FreeSans",
    "Chandas",
    "Kalimati",
    "Uttara",
    "Lucida Sans",
    "gargi Medium",
    "Lohit Devanagari",
    "Arial Unicode MS Bold",
];

const BENGALI_FONTS: &[&str] = &[
    "Bangla Medium",
    "Lohit Bengali",
    "Mukti Narrow",
    "Mukti Narrow Bold",
    "Likhan Medium",
    "Arial Unicode MS Bold",
];

const TAMIL_FONTS: &[&str] = &[
    "TAMu_Kadambri",
    "TAMu_Kalyani",
    "TAMu_Maduram",
    "TSCu_Paranar",
    "Lohit Tamil",
    "Arial Unicode MS Bold",
];

const THAI_FONTS: &[&str] = &[
    "FreeSerif",
    "FreeSerif Italic",
    "Garuda",
    "Norasi",
    "Lucida Sans Typewriter",
    "Lucida Sans",
    "Garuda Oblique",
    "Norasi Oblique",
    "Norasi Italic",
    "Garuda Bold",
    "Norasi Bold",
];

const KHMER_FONTS: &[&str] = &[
    "Khmer OS",
    "Khmer OS System",
    "Khmer OS Battambang",
    "Khmer OS Bokor",
    "Khmer OS Content",
    "Khmer OS Fasthand",
];

const CHI_SIM_FONTS: &[&str] = &[
    "AR PL UKai CN",
    "AR PL UMing Patched Light",
    "Arial Unicode MS",
    "Arial Unicode MS Bold",
    "WenQuanYi Zen Hei Medium",
];

const CHI_TRA_FONTS: &[&str] = &[
    "AR PL UKai TW",
    "AR PL UMing TW MBE Light",
    "AR PL UKai Patched",
    "AR PL UMing Patched Light",
    "Arial Unicode MS",
    "Arial Unicode MS Bold",
    "WenQuanYi Zen Hei Medium",
];

const JPN_FONTS: &[&str] = &[
    "TakaoExGothic",
    "TakaoExMincho",
    "TakaoGothic",
    "TakaoMincho",
    "TakaoPGothic",
    "TakaoPMincho",
    "VL Gothic",
    "VL PGothic",
    "Noto Sans Japanese Bold",
    "Noto Sans Japanese Light",
];

const KOREAN_FONTS: &[&str] = &[
    "Arial Unicode MS",
    "Arial Unicode MS Bold",
    "Baekmuk Batang Patched",
    "Baekmuk Batang",
    "Baekmuk Dotum",
    "Baekmuk Gulim",
    "Baekmuk Headline",
];

const RTL_LANGUAGES: &[&str] = &[
    "ara", "div", "fas", "pus", "snd", "syr", "uig", "urd", "kur_ara", "heb", "yid",
];

const COMBINING_MARK_LANGUAGES: &[&str] = &[
    "asm", "ben", "bih", "hin", "mar", "nep", "guj", "kan", "mal", "tam", "tel", "pan",
    "dzo", "sin", "san", "bod", "ori", "khm", "mya", "tha", "lao", "jav", "jav_java",
];

/// Unicode normalisation mode handed to the unicharset extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NormMode {
    /// Plain composition
    Combined = 1,
    /// Scripts that need combining-mark handling
    CombiningMarks = 2,
}

impl NormMode {
    pub fn as_arg(&self) -> String {
        (*self as u8).to_string()
    }
}

/// Parameters resolved for one language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageParameters {
    pub fonts: Vec<String>,
    pub exposures: Vec<i32>,
    pub leading: u32,
    pub norm_mode: NormMode,
    pub lang_is_rtl: bool,
    /// Appended to every main rendering call
    pub text2image_extra_args: Vec<String>,
    /// Script filters for corpus preparation
    pub filter_arguments: Vec<String>,
    pub word_dawg_factor: f64,
    pub number_dawg_factor: f64,
    pub bigram_dawg_factor: f64,
    pub punc_dawg_factor: Option<f64>,
    pub word_dawg_size: Option<u32>,
    pub mix_lang: String,
}

impl Default for LanguageParameters {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            exposures: Vec::new(),
            leading: 32,
            norm_mode: NormMode::Combined,
            lang_is_rtl: false,
            text2image_extra_args: Vec::new(),
            filter_arguments: Vec::new(),
            word_dawg_factor: 0.05,
            number_dawg_factor: 0.125,
            bigram_dawg_factor: 0.015,
            punc_dawg_factor: None,
            word_dawg_size: None,
            mix_lang: "eng".to_string(),
        }
    }
}

/// Source of per-language parameters
pub trait LanguageResolver: Send + Sync {
    /// Resolve parameters for `lang_code`. Fonts and exposures requested by
    /// the operator take precedence over the table defaults.
    fn resolve(
        &self,
        lang_code: &str,
        requested_fonts: Option<&[String]>,
        requested_exposures: Option<&[i32]>,
    ) -> Result<LanguageParameters, PipelineError>;
}

/// Built-in parameter table
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinLanguageTable;

fn fonts(list: &[&str]) -> Vec<String> {
    list.iter().map(|f| f.to_string()).collect()
}

impl LanguageResolver for BuiltinLanguageTable {
    fn resolve(
        &self,
        lang_code: &str,
        requested_fonts: Option<&[String]>,
        requested_exposures: Option<&[i32]>,
    ) -> Result<LanguageParameters, PipelineError> {
        let mut params = LanguageParameters::default();
        let mut table_fonts: &[&str] = &[];

        match lang_code {
            "eng" => params.word_dawg_factor = 0.03,
            "fra" | "ita" | "spa" | "por" | "nld" => {}
            "deu" => params.word_dawg_factor = 0.125,
            "enm" => {
                params.text2image_extra_args.push("--ligatures".to_string());
                table_fonts = FRAKTUR_FONTS;
            }
            "frm" => {
                params.filter_arguments.push("--make_early_language_variant=fra".to_string());
                params.text2image_extra_args.push("--ligatures".to_string());
                table_fonts = FRAKTUR_FONTS;
            }
            "rus" | "ukr" => {
                params.mix_lang = "rus".to_string();
                table_fonts = RUSSIAN_FONTS;
            }
            "ell" => table_fonts = GREEK_FONTS,
            "ara" => table_fonts = ARABIC_FONTS,
            "fas" | "urd" => table_fonts = PERSIAN_FONTS,
            "heb" | "yid" => {
                params.number_dawg_factor = 0.05;
                params.word_dawg_factor = 0.08;
                table_fonts = HEBREW_FONTS;
            }
            "hin" => {
                params.mix_lang = "hin".to_string();
                params.word_dawg_factor = 0.15;
                table_fonts = DEVANAGARI_FONTS;
            }
            "ben" => {
                params.mix_lang = "ben".to_string();
                params.word_dawg_factor = 0.15;
                table_fonts = BENGALI_FONTS;
            }
            "tam" => {
                params.mix_lang = "tam".to_string();
                params.word_dawg_factor = 0.15;
                params.text2image_extra_args.push("--char_spacing=0.5".to_string());
                table_fonts = TAMIL_FONTS;
            }
            "khm" => {
                params.mix_lang = "khm".to_string();
                params.word_dawg_factor = 0.15;
                table_fonts = KHMER_FONTS;
            }
            "tha" => {
                params.mix_lang = "tha".to_string();
                params.word_dawg_factor = 0.01;
                params.filter_arguments.push("--segmenter_lang=tha".to_string());
                params.leading = 48;
                table_fonts = THAI_FONTS;
            }
            "chi_sim" => {
                params.mix_lang = "chi_sim".to_string();
                params.punc_dawg_factor = Some(0.015);
                params.word_dawg_factor = 0.015;
                params.filter_arguments.extend([
                    "--charset_filter=chi_sim".to_string(),
                    "--segmenter_lang=chi_sim".to_string(),
                ]);
                table_fonts = CHI_SIM_FONTS;
            }
            "chi_tra" => {
                params.mix_lang = "chi_tra".to_string();
                params.word_dawg_factor = 0.015;
                params.filter_arguments.extend([
                    "--charset_filter=chi_tr".to_string(),
                    "--segmenter_lang=chi_tra".to_string(),
                ]);
                table_fonts = CHI_TRA_FONTS;
            }
            "jpn" => {
                params.mix_lang = "jpn".to_string();
                params.word_dawg_factor = 0.015;
                params.filter_arguments.extend([
                    "--charset_filter=jpn".to_string(),
                    "--segmenter_lang=jpn".to_string(),
                ]);
                table_fonts = JPN_FONTS;
            }
            "kor" => {
                params.mix_lang = "kor".to_string();
                params.word_dawg_factor = 0.015;
                params.number_dawg_factor = 0.05;
                params.filter_arguments.extend([
                    "--charset_filter=kor".to_string(),
                    "--segmenter_lang=kor".to_string(),
                ]);
                table_fonts = KOREAN_FONTS;
            }
            _ => return Err(PipelineError::UnknownLanguage(lang_code.to_string())),
        }

        params.fonts = match requested_fonts {
            Some(requested) if !requested.is_empty() => requested.to_vec(),
            _ if !table_fonts.is_empty() => fonts(table_fonts),
            _ => fonts(LATIN_FONTS),
        };

        params.exposures = match requested_exposures {
            Some(requested) if !requested.is_empty() => requested.to_vec(),
            _ => vec![0],
        };

        if RTL_LANGUAGES.contains(&lang_code) {
            params.lang_is_rtl = true;
            params.norm_mode = NormMode::CombiningMarks;
        } else if COMBINING_MARK_LANGUAGES.contains(&lang_code) {
            params.norm_mode = NormMode::CombiningMarks;
        }

        debug!(
            "Language {}: {} fonts, exposures {:?}, norm mode {}, rtl {}",
            lang_code,
            params.fonts.len(),
            params.exposures,
            params.norm_mode.as_arg(),
            params.lang_is_rtl
        );

        Ok(params)
    }
}

/// Whether the renderer should lay this font out vertically
pub fn is_vertical_font(font: &str) -> bool {
    VERTICAL_FONTS.contains(&font)
}
