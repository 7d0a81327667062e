//! Prompt templates for every call the pipeline makes.
//!
//! Generation and refinement both pin the exact THOUGHT/ANSWER section format
//! the parser expects; the judge's user prompt carries the lettered candidate
//! listing built by the judge stage.

/// System prompt for candidate generation.
pub const GEN_SYS: &str = r#"You are a professional assistant who solves problems step by step.
You MUST ALWAYS use the EXACT format provided, with THOUGHT and ANSWER sections.
If you discover the claim is false, your ANSWER line must clearly state that and give the divisor(s) or counter-example.
Do not add any other sections or text."#;

/// System prompt for critique.
pub const CRIT_SYS: &str = r#"You are a strict logician who spots errors. Your task is to:
1. Check for logical contradictions in the reasoning
2. Verify mathematical or factual accuracy
3. Ensure each step follows from the previous one
4. Look for unsupported assumptions
5. Check if the conclusion matches the reasoning

If you find ANY issues, list them specifically. If there are NO issues, output exactly "NO ISSUE"."#;

/// System prompt for refinement.
pub const REF_SYS: &str = "You are the original author. Rewrite your answer fixing every issue \
the critic found. Use the SAME THOUGHT/ANSWER template.";

/// System prompt for judgment.
pub const JUDGE_SYS: &str = r#"You are an impartial judge who extracts reusable heuristics from successful reasoning.
Your task is to:
1. Choose the single best answer based on:
   - Factual correctness (even if it contradicts the prompt's assumption)
   - Proper THOUGHT/ANSWER format
   - Clear step-by-step reasoning
2. Extract general rules that made the answer successful
3. Format rules as reusable heuristics that could apply to similar problems
4. Focus on reasoning patterns, not specific facts
5. Make rules abstract enough to be widely applicable"#;

/// System prompt for the consistency check.
pub const CONSISTENCY_SYS: &str = "You are a semantic consistency checker. Your task is to \
determine if an answer correctly assesses and justifies the truth of a claim. Output only YES \
or NO followed by a brief explanation.";

/// Template the refinement call instructs the model to rewrite into.
const TEMPLATE: &str = r#"THOUGHT:
<step-by-step mathematical reasoning>

ANSWER:
<one-line mathematical conclusion>"#;

/// User prompt for candidate generation.
pub fn gen_user(question: &str) -> String {
    format!(
        r#"QUESTION:
{question}

You MUST use EXACTLY this format, with no other text:

THOUGHT:
1. First, analyze what the question is asking
2. Then, break down the problem into logical steps
3. Work through each step carefully
4. Make a clear conclusion based on your analysis

ANSWER:
<one-line conclusion>"#
    )
}

/// User prompt for critique of a candidate's two sections.
pub fn crit_user(thought: &str, answer: &str) -> String {
    format!(
        r#"TASK: Review the reasoning and list any logical flaws OR output exactly **NO ISSUE**.

REASONING:
{thought}

ANSWER:
{answer}

Check specifically for:
1. Contradictions between steps
2. Mathematical errors
3. Logical fallacies
4. Unsupported claims
5. Mismatch between reasoning and conclusion"#
    )
}

/// User prompt for refinement: previous canonical text, verbatim critique,
/// and the template to rewrite into.
pub fn ref_user(raw: &str, critique: &str) -> String {
    format!(
        "YOUR PREVIOUS ANSWER:\n{raw}\n\nCRITIC SAYS:\n{critique}\n\n\
         Please rewrite using this template:\n\n{TEMPLATE}"
    )
}

/// User prompt for judgment over the lettered candidate listing.
pub fn judge_user(candidates: &str) -> String {
    format!(
        r#"Below are the candidate answers tagged A, B, C… Choose the single best one
based on factual correctness and proper reasoning (even if it contradicts the prompt).
Then extract general heuristics that made the answer successful; begin each rule with "RULE:".

{candidates}

FORMAT:
Best: <letter>
RULES:
- RULE: <abstract, reusable heuristic>
- RULE: <another general principle>"#
    )
}

/// User prompt for the consistency check, phrased for truth-assessment tasks
/// or generic question/answer matching.
pub fn consistency_user(question: &str, answer: &str, truth_assessment: bool) -> String {
    let check = if truth_assessment {
        "Does the ANSWER correctly assess the truth of the claim and justify it?"
    } else {
        "Does the ANSWER match what the question is asking for?"
    };
    format!(
        "QUESTION: {question}\nANSWER: {answer}\n\n{check}\n\
         Answer YES or NO followed by a brief explanation."
    )
}
