//! Instruction prompts for the three analysis tabs.
//!
//! Every prompt is combined with the job description through
//! [`full_prompt`] and sent together with the first-page image of the resume.
//! The match-score prompt fixes the `Match Score: NN%` convention that
//! [`crate::pipeline::score::extract_score`] relies on; keep them in sync.

/// Summary tab.
pub const SUMMARY_PROMPT: &str =
    "You are an expert resume reviewer. Analyze this resume and provide a clear, concise summary...";

/// Improvement tab: issues, suggestions and course recommendations.
pub const IMPROVEMENT_PROMPT: &str = "You are a professional career coach and resume reviewer. \
Analyze this resume based on the job description. \
Identify specific areas where the candidate can improve to be a stronger fit for the job. \
For each improvement point:\n\
- Clearly state the issue.\n\
- Provide a practical suggestion.\n\
- If possible, recommend an **online course** with a direct link to help upskill in that area \
(prefer Coursera, Udemy, freeCodeCamp).\n\n\
Format your response like this:\n\n\
### Area for Improvement: <Title>\n\
- **Issue:** <What’s missing or weak>\n\
- **Suggestion:** <How to fix it>\n\
- **Course Recommendation (if applicable):** [Course Title](Course Link)\n";

/// Match-score tab. The first line of the answer must be `Match Score: X%`.
pub const MATCH_SCORE_PROMPT: &str = "You are an ATS system. \
Based on the job description and resume, evaluate the match percentage for the candidate and respond with:\n\
Match Score: X%\n\
Also briefly explain why you gave this score, mentioning relevant strengths and missing points.\n\
Make sure the score is the first line and clearly written as: Match Score: 85%.";

/// Combine the job description with one tab's instruction.
pub fn full_prompt(job_description: &str, instruction: &str) -> String {
    format!("Job Description:\n{job_description}\n\nInstruction:\n{instruction}")
}
