//! Prompt templates for the gateway endpoints. One builder per endpoint.

/// Context used when the caller gives none.
pub const DEFAULT_QUESTION_CONTEXT: &str = "General software engineer";

pub fn generate_question_prompt(context: &str, question_number: u32, total_questions: u32) -> String {
    let context = if context.trim().is_empty() {
        DEFAULT_QUESTION_CONTEXT
    } else {
        context
    };

    format!(
        "You are an expert interview coach. Generate a single behavioral interview question for question {question_number} of {total_questions}.

Context: {context}

Requirements:
- The question should be realistic and commonly asked in tech interviews
- It should be open-ended and allow for a 2-3 minute answer
- It should assess soft skills like communication, problem-solving, teamwork, or leadership
- Return ONLY the question text, nothing else

Question:"
    )
}

pub fn analyze_response_prompt(question: &str, transcript: &str) -> String {
    format!(
        "You are an expert interview evaluator. Analyze this interview response.

Question: {question}

Candidate's Response: {transcript}

Provide a structured evaluation in JSON format with these fields:
- score (0-100): Overall score
- strengths (array of 2-3 key strengths)
- improvements (array of 2-3 areas to improve)
- feedback (1-2 sentences of constructive feedback)

Return ONLY valid JSON, no additional text."
    )
}

pub fn analyze_communication_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following interview transcript and provide metrics for:
1. Communication Skills (0-100): How well structured and articulate is the response?
2. Vocabulary (0-100): Quality and variety of words used
3. Confidence (0-100): How confident does the speaker sound?
4. Body Language (0-100): Inferred confidence and engagement from speech patterns
5. Clarity (0-100): How clear and understandable is the response?

Transcript: \"{transcript}\"

Respond in JSON format:
{{
  \"communicationSkills\": number,
  \"vocabulary\": number,
  \"confidence\": number,
  \"bodyLanguage\": number,
  \"clarity\": number
}}"
    )
}

pub fn analyze_code_prompt(code: &str, language: &str, problem_description: &str) -> String {
    format!(
        "Analyze the following {language} code for a problem: \"{problem_description}\"

Code:
```{language}
{code}
```

Provide:
1. Code Quality score (0-100)
2. Efficiency score (0-100)
3. Readability score (0-100)
4. List of 3-5 specific suggestions for improvement
5. List of 3-5 optimization recommendations

Respond in JSON format:
{{
  \"codeQuality\": number,
  \"efficiency\": number,
  \"readability\": number,
  \"suggestions\": [\"suggestion1\", \"suggestion2\", ...],
  \"optimizations\": [\"optimization1\", \"optimization2\", ...]
}}"
    )
}

/// Tip focus, chosen by the request's `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipCategory {
    Communication,
    Coding,
}

impl TipCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "communication" => Some(TipCategory::Communication),
            "coding" => Some(TipCategory::Coding),
            _ => None,
        }
    }
}

pub fn generate_tips_prompt(category: TipCategory, skill_level: &str) -> String {
    let ask = match category {
        TipCategory::Communication => format!(
            "Generate 5 specific, actionable tips for improving interview communication skills at {skill_level} level. Focus on practical advice that can be immediately applied."
        ),
        TipCategory::Coding => format!(
            "Generate 5 specific, actionable tips for improving coding problem-solving skills at {skill_level} level. Focus on algorithm optimization, code quality, and efficiency."
        ),
    };
    format!("{ask}\n\nReturn as a JSON array of strings.")
}
