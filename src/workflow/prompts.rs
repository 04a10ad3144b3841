//! 各环节的提示词

use crate::models::taxonomy::join_labels;
use crate::models::ItemRequest;
use crate::workflow::stage::Stage;

/// 出题示例
pub const EXAMPLE_ITEMS: &str = r#"
<example#1> A 27-year-old woman comes to the office for counseling prior to conception. She states that a friend recently delivered a newborn with a neural tube defect and she wants to decrease her risk for having a child with this condition. She has no history of major medical illness and takes no medications. Physical examination shows no abnormalities. It is most appropriate to recommend that this patient begin supplementation with a vitamin that is a cofactor in which of the following processes? (A) Biosynthesis of nucleotides (B) Protein gamma glutamate carboxylation (C) Scavenging of free radicals (D) Transketolation (E) Triglyceride lipolysis Correct Answer: A </example#1>

<example#2> A 26-year-old woman comes to the physician with her husband for counseling prior to conception. Her mother and three of her five siblings have type 2 diabetes mellitus. She is 170 cm (5 ft 7 in) tall and weighs 82 kg (180 lb); BMI is 28 kg/m2. Her blood pressure is 148/84 mm Hg. Physical examination shows no other abnormalities. Her fasting serum glucose concentration is 110 mg/dL. Which of the following is the most appropriate initial statement by the physician?

(A) "Let's review ways you can optimize your own health before conceiving." (B) "We should test you for islet cell antibodies before you try to conceive." (C) "You can conceive right away since you are in good health." (D) "You should avoid gaining weight during pregnancy because you are already overweight and at risk for type 2 diabetes mellitus." (E) "You should have no problems with your pregnancy if you start insulin therapy." Correct Answer: A </example#2>

<example#3> {Patient Information: {Age: 6 years Gender: M, Race/Ethnicity: unspecified, Site of Care: office} } The patient is brought by his mother because of a 1-month history of bleeding gums after brushing his teeth, increasingly severe muscle and joint pain, fatigue, and easy bruising. His mother says he has lost six baby teeth and has been irritable during this time. Use of acetaminophen has provided minimal relief of his pain. He has autism spectrum disorder. He is not toilet-trained. He has a 10-word vocabulary. Vital signs and oxygen saturation on room air are within normal limits. The patient appears alert but does not speak or make eye contact. Skin is pale and coarse. Examination of the scalp shows erythematous hair follicles. Dentition is poor, and gingivae bleed easily to touch. Multiple ecchymoses and petechiae are noted over the trunk and all extremities. There is marked swelling and tenderness to palpation of the elbow, wrist, knee, and ankle joints. He moves all extremities in a limited, guarded manner. Deep tendon reflexes are absent throughout. It is most appropriate to obtain specific additional history regarding which of the following in this patient? (A) Diet (B) Evidence of pica (C) Herbal supplementations (D) Lead exposure (E) Self-injurious behaviors Correct Answer: A </example#3>
"#;

/// 三位审稿人共用的审稿说明
const REVIEWER_BRIEF: &str = "As a medical expert serving as a reviewer for USMLE item development, please review the item. Check that it conforms to the requested USMLE style and that no information is missing. Edit and annotate the item for clarity, grammar and punctuation, uniformity of style and technical item flaws, particularly those that might benefit test-wise examinees or add irrelevant difficulty. If there is a clinical setting, most items are in the form of a patient vignette in which the first sentence provides the patient age, gender, site of care, presenting complaint and its duration. Subsequent sentences provide additional patient history, physical findings, the results of diagnostic studies and/or response to initial treatment.";

/// 各审稿人的侧重点（按序号）
const REVIEWER_FOCUS: [&str; 3] = [
    "Also, focus more on scientific accuracy and clinical relevance.",
    "Also, focus more on psychometric quality: item construction and option quality.",
    "Also, focus more on clarity, formatting, and style guidelines.",
];

/// 环节对应的系统指令
pub fn system_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Writer => {
            "You are an experienced USMLE item writer. Create a high-quality MCQ item following USMLE guidelines."
        }
        Stage::Reviewer(_) => "You are an experienced USMLE item reviewer.",
        Stage::Editorial => "You are the editorial coordinator.",
        Stage::AuthorRevision => "You are the original item writer reviewing feedback.",
        Stage::FinalDecision => "You are the editorial coordinator making the final decision.",
    }
}

/// 出题人提示词
pub fn writer_prompt(request: &ItemRequest) -> String {
    format!(
        r#"Study these example items carefully:
{}

Now, create a similar multiple choice question for:
Disciplines: {}
Systems: {}
Competencies: {}
Additional elements incorporated into the MCQ: {}

Follow the same format as the examples."#,
        EXAMPLE_ITEMS,
        join_labels(&request.disciplines),
        join_labels(&request.systems),
        join_labels(&request.competencies),
        request.keywords.trim()
    )
}

/// 第 `slot` 位审稿人（从 0 开始）的提示词
pub fn reviewer_prompt(slot: usize, history_text: &str) -> String {
    let focus = REVIEWER_FOCUS.get(slot).copied().unwrap_or_default();
    format!("{} {}\n\nHistory:\n{}", REVIEWER_BRIEF, focus, history_text)
}

/// 编辑部汇总提示词
pub fn editorial_prompt(history_text: &str) -> String {
    format!(
        r#"Synthesize all reviews and provide a comprehensive summary for the item writer.

History:
{}"#,
        history_text
    )
}

/// 作者修订提示词
pub fn revision_prompt(history_text: &str) -> String {
    format!(
        r#"Now you are the author reviewing the item draft you developed as well as the comments/suggestions from three NBME editorial staff members.

Please carefully review the materials provided, respond to queries from the staff editor, verify the correct answer and classification codes, and confirm the appearance of any associated pictorials. Any disagreements about phrasing should be documented so that they can be presented to the editorial staff again.

Provide your revised version of the item and explain your responses to the feedback.

History:
{}"#,
        history_text
    )
}

/// 最终决定提示词
pub fn decision_prompt(history_text: &str) -> String {
    format!(
        r#"As the editorial staff, make the final decision on this item.
Review the entire development process and either:
1. Accept the item as is
2. Request further revisions
3. Reject the item

History:
{}"#,
        history_text
    )
}
