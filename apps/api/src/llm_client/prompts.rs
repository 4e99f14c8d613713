// Prompts for the summarizer and the project extractor.
// `{cv_json}` is replaced with the pretty-printed CV document.

pub const BLURB_SYSTEM: &str = "You are an experienced recruitment consultant. \
    You write concise, factual candidate profiles for client-facing CVs. \
    Respond with the profile text only: no headings, no markdown, no preamble.";

pub const BLURB_PROMPT: &str = "\
Write a professional profile of 80 to 120 words for the candidate below.
Use third person. Mention their most recent role, total years of experience,
core skills and strongest qualifications. Only use facts present in the data.

Candidate CV (JSON):
{cv_json}";

pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences.";

pub const PROJECTS_PROMPT: &str = "\
List the notable projects described in the candidate's CV below.
Return a JSON array; each element is an object with the keys
\"name\", \"employer\", \"description\" and \"technologies\" (array of strings).
Return [] if the CV mentions no projects. Do not invent projects.

Candidate CV (JSON):
{cv_json}";
