use dialoguer::{Confirm, Input};
use std::io::{BufRead, Stdout, Write};

use super::error::PromptError;

const INVALID_CHOICE: &str = "Invalid input, try again";
const NOT_AN_INTEGER: &str = "Please enter an integer.";
const KEY_QUESTION: &str = "Enter index of keys you wish to extract (Press Enter when done)";

/// How many leading entries of each array to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCount {
    All,
    First(usize),
}

impl EntryCount {
    pub fn limit(&self, len: usize) -> usize {
        match self {
            Self::All => len,
            Self::First(n) => (*n).min(len),
        }
    }
}

/// One answer to the key selection question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChoice {
    Done,
    All,
    Key(usize),
}

pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// `*` anywhere in the answer means every entry
pub fn parse_entry_count(answer: &str) -> Result<EntryCount, &'static str> {
    let answer = answer.trim();
    if answer.contains('*') {
        return Ok(EntryCount::All);
    }
    answer
        .parse::<usize>()
        .map(EntryCount::First)
        .map_err(|_| NOT_AN_INTEGER)
}

/// An empty answer ends the selection and `*` selects every key. Anything else must be one
/// of the listed indices written exactly as listed.
pub fn parse_key_choice(answer: &str, keys: &[String]) -> Result<KeyChoice, &'static str> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(KeyChoice::Done);
    } else if answer.contains('*') {
        return Ok(KeyChoice::All);
    }
    (0..keys.len())
        .find(|idx| idx.to_string() == answer)
        .map(KeyChoice::Key)
        .ok_or(INVALID_CHOICE)
}

/// Question/answer session with a user.
///
/// Questions are given without a trailing separator; each implementation decorates them.
pub trait Prompt {
    fn ask(&mut self, question: &str) -> Result<String, PromptError>;

    fn ask_yes_no(&mut self, question: &str) -> Result<bool, PromptError>;

    fn ask_entry_count(&mut self, question: &str) -> Result<EntryCount, PromptError>;

    fn ask_key_choice(&mut self, keys: &[String]) -> Result<KeyChoice, PromptError>;

    /// Where reports are written
    fn output(&mut self) -> &mut dyn Write;

    /// List the keys and let the user pick them by index until an empty answer or `*`.
    /// Returns the selected keys in the order they were picked.
    fn select_keys(&mut self, keys: &[String]) -> Result<Vec<String>, PromptError> {
        let out = self.output();
        writeln!(out, "Keys which can be extracted:")?;
        for (idx, key) in keys.iter().enumerate() {
            writeln!(out, "{idx}: {key}")?;
        }
        writeln!(out, "*: Extract All")?;
        out.flush()?;

        let mut selected = Vec::new();
        loop {
            match self.ask_key_choice(keys)? {
                KeyChoice::Done => break,
                KeyChoice::All => {
                    selected.extend(keys.iter().cloned());
                    break;
                }
                KeyChoice::Key(idx) => selected.push(keys[idx].clone()),
            }
        }
        Ok(selected)
    }
}

/// Prompts on the attached terminal
pub struct TerminalPrompter {
    stdout: Stdout,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        let answer: String = Input::<String>::new().with_prompt(question).interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn ask_yes_no(&mut self, question: &str) -> Result<bool, PromptError> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()?)
    }

    fn ask_entry_count(&mut self, question: &str) -> Result<EntryCount, PromptError> {
        let answer: String = Input::<String>::new()
            .with_prompt(question)
            .validate_with(|s: &String| parse_entry_count(s).map(|_| ()))
            .interact_text()?;
        parse_entry_count(&answer).map_err(PromptError::Rejected)
    }

    fn ask_key_choice(&mut self, keys: &[String]) -> Result<KeyChoice, PromptError> {
        let answer: String = Input::<String>::new()
            .with_prompt(KEY_QUESTION)
            .allow_empty(true)
            .validate_with(|s: &String| parse_key_choice(s, keys).map(|_| ()))
            .interact_text()?;
        parse_key_choice(&answer, keys).map_err(PromptError::Rejected)
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }
}

/// Prompts over any line-based input and output, for piped input and tests
pub struct LinePrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn writer(&self) -> &W {
        &self.output
    }

    fn read_answer(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        self.read_answer(&format!("{question}: "))
    }

    fn ask_yes_no(&mut self, question: &str) -> Result<bool, PromptError> {
        loop {
            let answer = self.read_answer(&format!("{question} (y/n): "))?;
            match parse_yes_no(&answer) {
                Some(yes) => return Ok(yes),
                None => writeln!(self.output, "{INVALID_CHOICE}")?,
            }
        }
    }

    fn ask_entry_count(&mut self, question: &str) -> Result<EntryCount, PromptError> {
        loop {
            match parse_entry_count(&self.ask(question)?) {
                Ok(count) => return Ok(count),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn ask_key_choice(&mut self, keys: &[String]) -> Result<KeyChoice, PromptError> {
        loop {
            match parse_key_choice(&self.ask(KEY_QUESTION)?, keys) {
                Ok(choice) => return Ok(choice),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn keys() -> Vec<String> {
        vec![
            String::from("DetectedPos"),
            String::from("Flags"),
            String::from("Origin"),
        ]
    }

    #[test]
    fn test_parse_key_choice() {
        let keys = keys();
        assert_eq!(parse_key_choice("", &keys), Ok(KeyChoice::Done));
        assert_eq!(parse_key_choice("  ", &keys), Ok(KeyChoice::Done));
        assert_eq!(parse_key_choice("*", &keys), Ok(KeyChoice::All));
        assert_eq!(parse_key_choice("2", &keys), Ok(KeyChoice::Key(2)));
        assert_eq!(parse_key_choice(" 1 ", &keys), Ok(KeyChoice::Key(1)));
        assert_eq!(parse_key_choice("3", &keys), Err("Invalid input, try again"));
        assert_eq!(parse_key_choice("+1", &keys), Err("Invalid input, try again"));
        assert_eq!(parse_key_choice("01", &keys), Err("Invalid input, try again"));
        assert_eq!(parse_key_choice("-1", &keys), Err("Invalid input, try again"));
        assert_eq!(parse_key_choice("abc", &keys), Err("Invalid input, try again"));
        assert_eq!(parse_key_choice("0", &[]), Err("Invalid input, try again"));
    }

    #[test]
    fn test_parse_entry_count() {
        assert_eq!(parse_entry_count("10"), Ok(EntryCount::First(10)));
        assert_eq!(parse_entry_count("0"), Ok(EntryCount::First(0)));
        assert_eq!(parse_entry_count("*"), Ok(EntryCount::All));
        assert_eq!(parse_entry_count("ten"), Err("Please enter an integer."));
        assert_eq!(parse_entry_count("-3"), Err("Please enter an integer."));
        assert_eq!(EntryCount::First(10).limit(3), 3);
        assert_eq!(EntryCount::All.limit(3), 3);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("YES"), Some(true));
        assert_eq!(parse_yes_no("y"), Some(true));
        assert_eq!(parse_yes_no("No"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn test_yes_no_retries() {
        let mut p = prompter("maybe\nYES\n");
        assert!(p.ask_yes_no("Continue?").unwrap());
        let out = String::from_utf8(p.writer().clone()).unwrap();
        assert!(out.contains("Continue? (y/n): "));
        assert!(out.contains("Invalid input, try again"));
    }

    #[test]
    fn test_entry_count() {
        let mut p = prompter("ten\n10\n*\n");
        assert_eq!(p.ask_entry_count("How many?").unwrap(), EntryCount::First(10));
        assert_eq!(p.ask_entry_count("How many?").unwrap(), EntryCount::All);
        let out = String::from_utf8(p.writer().clone()).unwrap();
        assert!(out.contains("Please enter an integer."));
    }

    #[test]
    fn test_select_keys() {
        let keys = keys();
        let mut p = prompter("1\n7\n01\nabc\n0\n\n");
        assert_eq!(
            p.select_keys(&keys).unwrap(),
            vec![String::from("Flags"), String::from("DetectedPos")]
        );
        let out = String::from_utf8(p.writer().clone()).unwrap();
        assert!(out.contains("2: Origin"));
        assert!(out.contains("*: Extract All"));
        assert_eq!(out.matches("Invalid input, try again").count(), 3);

        let mut p = prompter("2\n*\n");
        let selected = p.select_keys(&keys).unwrap();
        assert_eq!(selected.len(), 4);
        assert_eq!(selected[0], "Origin");
    }

    #[test]
    fn test_end_of_input() {
        let mut p = prompter("");
        assert!(matches!(p.ask("Path"), Err(PromptError::EndOfInput)));
    }
}
