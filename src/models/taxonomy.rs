//! 题目分类词表
//!
//! 学科（Discipline）、系统（System）、能力（Competency）三套固定词表，
//! 出题请求中以展示标签多选。

use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 定义一套词表：枚举、标签、按标签查找、serde 以标签读写
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $vocab:literal, $map:ident {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $variant ),+
        }

        static $map: phf::Map<&'static str, $name> = phf_map! {
            $( $label => $name::$variant ),+
        };

        impl $name {
            /// 词表中的全部取值（按展示顺序）
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// 展示标签
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// 按标签精确查找
            pub fn from_label(label: &str) -> Option<Self> {
                $map.get(label.trim()).copied()
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s).ok_or_else(|| ConfigError::UnknownLabel {
                    vocabulary: $vocab.to_string(),
                    label: s.to_string(),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

vocabulary! {
    /// 学科
    Discipline, "学科", DISCIPLINE_LABELS {
        BehavioralSciences => "Behavioral Sciences",
        Pharmacology => "Pharmacology",
        BiochemistryNutrition => "Biochemistry & Nutrition",
        Immunology => "Immunology",
        Genetics => "Genetics",
        HistologyCellBiology => "Histology & Cell Biology",
        Pathology => "Pathology",
        GrossAnatomyEmbryology => "Gross Anatomy & Embryology",
        Microbiology => "Microbiology",
        Physiology => "Physiology",
    }
}

vocabulary! {
    /// 器官系统
    BodySystem, "系统", SYSTEM_LABELS {
        ReproductiveEndocrine => "Reproductive & Endocrine Systems",
        SocialSciencesCommunication => "Social Sciences: Communication and Interpersonal Skills",
        HumanDevelopment => "Human Development",
        Cardiovascular => "Cardiovascular System",
        RespiratoryRenal => "Respiratory & Renal/Urinary Systems",
        Gastrointestinal => "Gastrointestinal System",
        BehavioralHealthNervous => "Behavioral Health & Nervous Systems/Special Senses",
        MusculoskeletalSkin => "Musculoskeletal, Skin & Subcutaneous Tissue",
        BiostatisticsEpidemiology => "Biostatistics & Epidemiology/Population Health",
        BloodLymphoreticular => "Blood & Lymphoreticular/Immune Systems",
        MultisystemProcesses => "Multisystem Processes & Disorders",
    }
}

vocabulary! {
    /// 能力
    Competency, "能力", COMPETENCY_LABELS {
        PatientCareDiagnosis => "Patient Care: Diagnosis",
        PracticeBasedLearning => "Practice–based Learning & Improvement",
        CommunicationInterpersonal => "Communication and Interpersonal Skills",
        MedicalKnowledge => "Medical Knowledge: Applying Foundational Science Concepts",
    }
}

/// 把多选标签拼成提示词中的一行
pub fn join_labels<T: Copy + Into<String>>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| (*item).into())
        .collect::<Vec<String>>()
        .join(", ")
}
