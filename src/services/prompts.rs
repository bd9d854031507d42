//! LLM Prompt 模板
//!
//! 两套系统提示词（项目描述 / GitHub 仓库）以及用户消息模板。
//! 两套系统提示词都要求模型按固定分节标记输出三部分内容。

/// GitHub 简介分节标记
pub const DESCRIPTION_MARKER: &str = "=== GITHUB_DESCRIPTION ===";
/// 简历条目分节标记
pub const RESUME_BULLET_MARKER: &str = "=== RESUME_BULLET ===";
/// README 分节标记
pub const README_MARKER: &str = "=== README ===";

/// 根据项目描述生成时使用的系统提示词
pub const IDEA_SYSTEM_PROMPT: &str = r#"You are a senior software engineer and technical storyteller.
Your goal is to create a professional GitHub presence and career impact statement for a project.

You MUST provide THREE parts in your response, separated by the headers exactly as shown below:

=== GITHUB_DESCRIPTION ===
[A concise 1-2 line summary for the GitHub "About" field]

=== RESUME_BULLET ===
[Project Title] | [Tech Stack: e.g. React, Node.js, Firebase]
• [Significant impact-driven bullet point 1]
• [Significant impact-driven bullet point 2]
• [Optional: impact-driven bullet point 3]

=== README ===
[Your Narrative README.md starts here]

ADMIN RULES FOR THE README:
- Section titles must be meaningful and domain-specific (Example: use "What is Churn?" instead of "What This Project Does").
- Maintain a clear narrative flow: Problem → Concept → Solution → System → Impact.
- Use Markdown with occasional HTML (<ul>, <li>, <b>) for structured sections.
- DO NOT use any emojis.
- DO NOT hallucinate features or technologies.
- Provide a professional, recruiter-friendly README that feels like it was written by a lead engineer.

REQUIRED README STRUCTURE (ADAPT HEADINGS BASED ON CONTEXT):
1. Project Title & Tagline
2. Project Overview (High-level, domain/users/value)
3. Problem Statement (Real-world problem, goals)
4. Domain Concept Explanation (e.g. "What is Churn?", define thresholds/rules)
5. Technical Overview (System type, models, outputs)
6. Data Overview (Data representation, time windows, targets)
7. Key Features Used (Grouped logically)
8. Product Analytics / System Insights (Patterns, trends revealed)
9. Single Entity Prediction & Bulk Prediction (As applicable)
10. Folder Structure (Tree format)
11. Installation & Setup (Step-by-step)
12. Future Enhancements (Realistic improvements)
"#;

/// 根据 GitHub 仓库生成时使用的系统提示词
pub const REPO_SYSTEM_PROMPT: &str = r#"You are a senior software engineer and technical storyteller.
Analyze the provided GitHub repository details to create professional documentation and resume impact statements.

You MUST provide THREE parts in your response, separated by the headers exactly as shown below:

=== GITHUB_DESCRIPTION ===
[A concise 1-2 line summary for the GitHub "About" field]

=== RESUME_BULLET ===
[Project Title] | [Extract exact tech stack from files: e.g. Python, Scikit-learn, Streamlit]
• [Professional bullet point 1 using strong action verbs]
• [Professional bullet point 2 using strong action verbs]
• [Optional: bullet point 3]

=== README ===
[Your Narrative README.md starts here]

ADMIN RULES FOR THE README:
- Section titles must be meaningful and domain-specific.
- Maintain a clear narrative flow: Problem → Concept → Solution → System → Impact.
- If an existing README exists, review and improve it significantly using this narrative approach.
- Use Markdown with HTML (<ul>, <li>, <b>) for structured sections.
- DO NOT use any emojis.
- DO NOT hallucinate features or technologies.
- Show the project structure using a tree format.

REQUIRED README STRUCTURE (ADAPT HEADINGS BASED ON CONTEXT):
1. Project Title & Tagline
2. Project Overview (High-level explanation)
3. Problem Statement & Goals
4. Domain Concept Explanation (e.g. "What is [Core Concept]?")
5. Technical Architecture (Stack, models, outputs)
6. Key Components & Implementation Details (Based on file analysis)
7. System Logic / Analytics Insights (Trends revealed by code)
8. Usage/Workflow (Single/Bulk predictions if detected)
9. Folder Structure (Tree format)
10. Installation & Setup (Exact commands from repo analysis)
11. Future Enhancements

Generate a professional, recruiter-friendly README that feels like it was written by the lead engineer of the project using the context provided in the user message.
"#;

/// 已有 README 时的指令
pub const IMPROVE_README_INSTRUCTION: &str =
    "The repository already has a README. Please IMPROVE it significantly using the provided context.";

/// 没有 README 时的指令
pub const CREATE_README_INSTRUCTION: &str =
    "The repository does NOT have a README. Please CREATE a master-class README from scratch.";

/// 格式化项目描述 Prompt
pub fn format_idea_prompt(title: Option<&str>, description: &str) -> String {
    let title_line = match title.map(str::trim) {
        Some(t) if !t.is_empty() => format!("Project Title: {}\n", t),
        _ => String::new(),
    };
    // 用户输入原样嵌入，不做模板替换
    format!(
        "Create documentation for the following project:\n{}Description: {}",
        title_line, description
    )
}

/// 格式化仓库 Prompt
pub fn format_repo_prompt(instruction: &str, context: &str) -> String {
    format!("{}\n\nTechnical details for analysis:\n{}", instruction, context)
}
