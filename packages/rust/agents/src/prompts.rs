//! Task instructions sent ahead of each stage's input.

use upscnews_shared::SyllabusConfig;

use crate::roles::AgentRole;

/// Build the task instructions for `role`.
///
/// The fetcher names the preferred publications; the tagger lists the topics.
pub fn task_prompt(role: AgentRole, syllabus: &SyllabusConfig) -> String {
    match role {
        AgentRole::NewsFetcher => fetch_task(&syllabus.news_sources),
        AgentRole::Tagger => tagging_task(&syllabus.topics),
        AgentRole::Summarizer => SUMMARIZE_TASK.to_string(),
        AgentRole::Linker => LINK_TASK.to_string(),
    }
}

const FETCH_INTRO: &str = "\
From the search results below, select the 5 to 10 articles most relevant to the UPSC Civil \
Services Examination. Prefer current events, policy updates, economic developments, \
international relations and environmental news from reputable Indian sources. Drop \
sensational or irrelevant items.";

const FETCH_FORMAT: &str = "\
Return only the selected articles, numbered from 1, in exactly this format:

1. <title>
Source: <source>
Date: <date>
Description: <description>
URL: <url>

Leave a blank line between articles. Copy titles, dates and URLs verbatim. Do not add \
commentary before or after the list.";

const SUMMARIZE_TASK: &str = "\
For each news article provided, write a concise, objective, UPSC-relevant summary that \
captures the information an aspirant needs. Keep the original title and URL.

Return only a JSON array, one object per article, with the keys \"Title\", \"URL\" and \
\"Summary\". You may also repeat the article's \"UPSC_Topics\" list.
Example: [{\"Title\": \"...\", \"URL\": \"...\", \"Summary\": \"...\"}]";

const LINK_TASK: &str = "\
Analyze the summaries and UPSC topics below. Identify interconnections, recurring themes and \
patterns between the articles, and explain why each link matters for a UPSC aspirant, \
connecting it to the broader General Studies topics or recent trends. Cite the specific \
articles involved.

Write clear, readable prose. Do not return JSON.";

fn fetch_task(sources: &[String]) -> String {
    let mut prompt = String::from(FETCH_INTRO);
    let named: Vec<&str> = sources
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !named.is_empty() {
        prompt.push_str("\n\nWhere the results allow, favour these publications: ");
        prompt.push_str(&named.join(", "));
        prompt.push('.');
    }
    prompt.push_str("\n\n");
    prompt.push_str(FETCH_FORMAT);
    prompt
}

fn tagging_task(topics: &[String]) -> String {
    let mut prompt = String::from(
        "Classify each article below into one or more of the following UPSC General Studies \
         topics. Use only topics from this list:\n",
    );
    for topic in topics {
        prompt.push_str("- ");
        prompt.push_str(topic);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nReturn only a JSON array, one object per article, with the keys \"Title\", \
         \"Description\", \"URL\" and \"UPSC_Topics\" (a list of strings). Copy Title, \
         Description and URL verbatim.\n\
         Example: [{\"Title\": \"...\", \"Description\": \"...\", \"URL\": \"...\", \
         \"UPSC_Topics\": [\"Indian Economy\"]}]",
    );
    prompt
}
