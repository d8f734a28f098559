//! The four agent personas and the stage each one serves.

use upscnews_shared::Stage;

/// One LLM persona of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    NewsFetcher,
    Tagger,
    Summarizer,
    Linker,
}

/// Static persona text sent as the system prompt.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl AgentProfile {
    /// Render the persona as a system prompt.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {}.\n\nGoal: {}\n\n{}",
            self.role, self.goal, self.backstory
        )
    }
}

const NEWS_FETCHER: AgentProfile = AgentProfile {
    role: "UPSC News Fetcher",
    goal: "Identify and fetch daily news articles highly relevant to the UPSC Civil Services \
           Examination syllabus from reputable Indian news sources and government publications.",
    backstory: "You are an expert news analyst with a deep understanding of the UPSC syllabus. \
                Your primary objective is to find current affairs articles that could be directly \
                useful for a UPSC aspirant, avoiding irrelevant or sensational content. You \
                prioritize quality, relevance, and accuracy. You focus on governance, economy, \
                environment, science and technology, international relations, history, geography \
                and social issues.",
};

const TAGGER: AgentProfile = AgentProfile {
    role: "UPSC Topic Classifier",
    goal: "Accurately classify news articles into relevant UPSC General Studies topics based on \
           their content.",
    backstory: "You are an expert in the UPSC Civil Services Examination syllabus. Your task is to \
                read news content and precisely assign one or more of the predefined UPSC General \
                Studies topics to it. You are meticulous and ensure that every classification is \
                relevant. You understand how current events relate to each GS topic.",
};

const SUMMARIZER: AgentProfile = AgentProfile {
    role: "UPSC News Summarizer",
    goal: "Generate concise, UPSC-relevant summaries for news articles, extracting key information \
           for aspirants.",
    backstory: "You specialize in distilling complex news articles into brief, impactful summaries \
                tailored for UPSC Civil Services Examination preparation. You focus on objectivity \
                and accuracy, highlighting facts that matter from an examination perspective, and \
                you keep the core message while avoiding needless jargon.",
};

const LINKER: AgentProfile = AgentProfile {
    role: "UPSC News Context Linker",
    goal: "Identify and explain interconnections, patterns, and contextual links between \
           different news articles, highlighting their significance for the UPSC Civil Services \
           Examination.",
    backstory: "You are highly analytical and specialize in cross-referencing and contextualizing \
                news for UPSC aspirants. You find relationships between seemingly unrelated \
                articles, identify evolving trends, and explain how events contribute to a broader \
                understanding of the General Studies papers.",
};

impl AgentRole {
    /// All roles in pipeline order.
    pub const ALL: [AgentRole; 4] = [
        AgentRole::NewsFetcher,
        AgentRole::Tagger,
        AgentRole::Summarizer,
        AgentRole::Linker,
    ];

    pub fn profile(&self) -> &'static AgentProfile {
        match self {
            Self::NewsFetcher => &NEWS_FETCHER,
            Self::Tagger => &TAGGER,
            Self::Summarizer => &SUMMARIZER,
            Self::Linker => &LINKER,
        }
    }

    /// The pipeline stage whose output this role produces.
    pub fn stage(&self) -> Stage {
        match self {
            Self::NewsFetcher => Stage::Fetching,
            Self::Tagger => Stage::Tagging,
            Self::Summarizer => Stage::Summarizing,
            Self::Linker => Stage::Linking,
        }
    }

    /// Short display name used in CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewsFetcher => "NewsFetcherAgent",
            Self::Tagger => "TaggerAgent",
            Self::Summarizer => "SummarizerAgent",
            Self::Linker => "LinkerAgent",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
