//! 破壊的操作の確認プロンプト

use std::io::{BufRead, Write};

/// 確認の取得方法
pub trait Confirm {
    /// `true` なら続行
    fn confirm(&mut self, question: &str) -> std::io::Result<bool>;
}

/// 常に続行（`--yes` 指定時）
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> std::io::Result<bool> {
        Ok(true)
    }
}

/// 1行読み取って `y` / `yes` のときだけ続行
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// 標準入力から確認を読む
pub type StdinConfirm = LineConfirm<std::io::StdinLock<'static>, std::io::Stdout>;

impl StdinConfirm {
    pub fn stdin() -> Self {
        LineConfirm::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> std::io::Result<bool> {
        write!(self.output, "{} [y/N]: ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        // EOF は拒否として扱う
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(input: &str) -> bool {
        let mut output = Vec::new();
        let mut confirm = LineConfirm::new(input.as_bytes(), &mut output);
        let answer = confirm.confirm("上書きしますか？").unwrap();
        assert!(String::from_utf8(output).unwrap().contains("[y/N]"));
        answer
    }

    #[test]
    fn test_accepts_yes() {
        assert!(ask("y\n"));
        assert!(ask("YES\n"));
    }

    #[test]
    fn test_declines_by_default() {
        assert!(!ask("n\n"));
        assert!(!ask("\n"));
        assert!(!ask(""));
        assert!(!ask("sure\n"));
    }
}
