//! CLI (Command Line Interface) mode
//!
//! Interactive REPL that calls the Statista tools directly.
//! Plain text is treated as a search query.

use std::sync::Arc;

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings, MenuBuilder,
    Prompt, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use serde_json::{Value as JsonValue, json};
use tokio::sync::Mutex;
use tracing::info;

use sg_core::{ContextLog, ToolContext, ToolManager, envelope_for};
use sg_mcp::{ChartDataTool, ListToolsTool, SearchStatisticsTool};

/// Session id used for the REPL's context log
const CLI_SESSION: &str = "cli";

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/search", "統計を検索 (/search <query>)"),
    ("/chart", "チャートデータを取得 (/chart <id>)"),
    ("/tools", "Statista ツール一覧を表示"),
    ("/history", "このセッションの検索・取得履歴を表示"),
    ("/help", "ヘルプを表示"),
    ("/exit", "プログラムを終了"),
    ("/quit", "プログラムを終了"),
];

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        // コマンド以外の入力は検索クエリなので補完しない
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// Custom prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Green.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.style.paint("statgate> ").to_string())
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: reedline::PromptEditMode,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }
}

/// A parsed REPL line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Chart(String),
    Tools,
    History,
    Help,
    Exit,
    Unknown(String),
    Empty,
}

/// Parse one input line. Text without a leading `/` is a search.
fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }
    if !input.starts_with('/') {
        return Command::Search(input.to_string());
    }

    let (cmd, rest) = match input.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (input, ""),
    };

    match cmd.to_lowercase().as_str() {
        "/search" | "/s" if !rest.is_empty() => Command::Search(rest.to_string()),
        "/chart" | "/c" if !rest.is_empty() => Command::Chart(rest.to_string()),
        "/tools" => Command::Tools,
        "/history" => Command::History,
        "/help" | "/?" => Command::Help,
        "/exit" | "/quit" | "/q" => Command::Exit,
        _ => Command::Unknown(input.to_string()),
    }
}

/// Run CLI interactive mode
pub async fn run_cli(tool_manager: ToolManager) -> anyhow::Result<()> {
    info!("Starting CLI mode with {} tools", tool_manager.len());

    let ctx = ToolContext::new(CLI_SESSION, Arc::new(Mutex::new(ContextLog::new())));

    // Welcome message
    print_welcome();

    // Setup keybindings
    let mut keybindings = default_keybindings();

    // Trigger completion on '/' key
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    // Setup hinter
    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    // Create line editor
    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => match parse_command(&line) {
                Command::Empty => continue,
                Command::Exit => {
                    println!("\n👋 さようなら！\n");
                    break;
                }
                Command::Help => print_help(),
                Command::History => print_history(&*ctx.log.lock().await),
                Command::Unknown(input) => {
                    eprintln!(
                        "\n❓ 不明なコマンド: {}。/help でコマンド一覧を確認してください。\n",
                        input
                    );
                }
                Command::Search(query) => {
                    let input = json!({ "query": query });
                    run_tool(&tool_manager, SearchStatisticsTool::NAME, input, &ctx).await;
                }
                Command::Chart(id) => {
                    let input = json!({ "statistic_id": id });
                    run_tool(&tool_manager, ChartDataTool::NAME, input, &ctx).await;
                }
                Command::Tools => {
                    run_tool(&tool_manager, ListToolsTool::NAME, json!({}), &ctx).await;
                }
            },
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("\n👋 さようなら！\n");
                break;
            }
            Err(err) => {
                eprintln!("\n❌ エラー: {}\n", err);
                break;
            }
        }
    }

    Ok(())
}

/// Execute a tool and print its text, or the error envelope on failure
async fn run_tool(tool_manager: &ToolManager, name: &str, input: JsonValue, ctx: &ToolContext) {
    info!("Executing tool: {} with input: {}", name, input);

    match tool_manager.execute(name, input, ctx).await {
        Ok(result) => println!("\n{}\n", result.output.trim_end()),
        Err(e) => {
            let envelope = envelope_for(&e);
            eprintln!(
                "\n❌ {} ({}): {}\n",
                envelope.message,
                envelope.code,
                envelope.data_str("details").unwrap_or_default()
            );
            if let Some(hint) = envelope.data_str("hint") {
                eprintln!("💡 {}\n", hint);
            }
        }
    }
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    // Tab key triggers completion
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Enter,
        ReedlineEvent::Submit,
    );
    // Esc key clears/closes menus
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Esc,
        ReedlineEvent::Esc,
    );
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('c'),
        ReedlineEvent::CtrlC,
    );
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('d'),
        ReedlineEvent::CtrlD,
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Up,
        ReedlineEvent::Up,
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Down,
        ReedlineEvent::Down,
    );
    keybindings
}

/// Print welcome message
fn print_welcome() {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          📊 statgate CLI - 対話モード                      ║");
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  検索したい内容を入力して Enter                             ║");
    println!("║  コマンド: /search, /chart, /tools, /history, /help, /exit ║");
    println!("║  / を入力するとコマンド候補が表示されます                   ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
}

/// Print help message
fn print_help() {
    println!();
    println!("📖 利用可能なコマンド:");
    for (cmd, desc) in COMMANDS {
        println!("  {} - {}", cmd, desc);
    }
    println!();
    println!("💡 ヒント: / から入力するとコマンド候補が表示されます");
    println!("💡 コマンドなしの入力はそのまま検索クエリになります");
    println!();
}

/// Print the session's searches and retrieved charts
fn print_history(log: &ContextLog) {
    println!();
    println!(
        "📜 履歴 (検索 {} 件, チャート {} 件):",
        log.searches().len(),
        log.charts().len()
    );
    println!("{}", "─".repeat(50));

    for (i, search) in log.searches().iter().enumerate() {
        println!(
            "{}. 🔍 {} ({} / {} 件)",
            i + 1,
            search.query,
            search.results.len(),
            search.results.total_found
        );
    }
    for (i, chart) in log.charts().iter().enumerate() {
        let title = chart
            .data
            .as_ref()
            .map(|d| d.title.as_str())
            .unwrap_or("(解析できませんでした)");
        println!("{}. 📈 {}: {}", i + 1, chart.statistic_id, title);
    }

    println!("{}", "─".repeat(50));
    println!();
}
