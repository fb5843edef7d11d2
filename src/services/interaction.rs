//! 交互输入 - 业务能力层
//!
//! 从列表中选择、是/否确认。终端实现读取 stdin，测试中可替换。

use std::io::{BufRead, Write};

/// 交互能力
pub trait Prompter {
    /// 从列表中选择一项，用户退出时返回 `None`
    fn select(&self, label: &str, items: &[String]) -> Option<usize>;

    /// 是/否确认
    fn confirm(&self, question: &str, default_yes: bool) -> bool;
}

/// 终端交互
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, label: &str, items: &[String]) -> Option<usize> {
        println!("\n--- {} ---", label);
        for (i, item) in items.iter().enumerate() {
            println!("  [{}] {}", i + 1, item);
        }
        loop {
            let Some(raw) = Self::read_line(&format!("\n请选择 [1-{}]: ", items.len())) else {
                println!("\n退出 (EOF)。");
                return None;
            };
            match parse_selection(&raw, items.len()) {
                Selection::Quit => return None,
                Selection::Index(index) => return Some(index),
                Selection::Invalid => println!("  选择无效，请重试。"),
            }
        }
    }

    fn confirm(&self, question: &str, default_yes: bool) -> bool {
        let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(raw) = Self::read_line(&format!("{} {}: ", question, suffix)) else {
                return false;
            };
            match parse_yes_no(&raw, default_yes) {
                Some(answer) => return answer,
                None => println!("  回答无效，请输入 y/n。"),
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Selection {
    Index(usize),
    Quit,
    Invalid,
}

fn parse_selection(raw: &str, len: usize) -> Selection {
    let raw = raw.trim().to_lowercase();
    if matches!(raw.as_str(), "q" | "quit" | "exit") {
        return Selection::Quit;
    }
    match raw.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Selection::Index(n - 1),
        _ => Selection::Invalid,
    }
}

fn parse_yes_no(raw: &str, default_yes: bool) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" => Some(default_yes),
        "y" | "yes" | "s" | "si" => Some(true),
        "n" | "no" | "q" | "quit" | "exit" => Some(false),
        _ => None,
    }
}
