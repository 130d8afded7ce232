//! # Memento Token
//!
//! Context-window token estimation for Claude Code projects.
//!
//! Discovers CLAUDE.md files, skills, commands, agents, hooks and MCP
//! configuration, counts their tokens and reports them against a budget.

pub mod analyzer;
pub mod reporter;
pub mod scanner;
pub mod tokenizer;

pub use analyzer::{
    analyze_file, expand_home, BudgetUsage, FilesAnalysis, ProjectAnalysis, ProjectAnalyzer,
    TokenReport, Totals, DEFAULT_BUDGET, DEFAULT_SYSTEM_PROMPT_TOKENS,
};
pub use scanner::{ArtifactCategory, ArtifactScanner, ConfigArtifact, ScanResult};
pub use tokenizer::{
    select_tokenizer, Cl100kTokenizer, HeuristicTokenizer, Tokenizer, HEURISTIC_TOLERANCE,
};
