//! Interactive line-based front end.
use crate::narrate::narrate;
use colored::Colorize;
use delve_game::{
    ActionChoice, BattleView, Combatant, Frontend, FrontendClosed, GameEvent, ItemId, Job,
};
use std::io::{BufRead, Write};

/// Prompts on `output`, reads answers from `input`. End of input or a broken
/// output stream closes the front end.
pub struct TerminalFrontend<R, W> {
    input: R,
    output: W,
    broken: bool,
}

impl<R: BufRead, W: Write> TerminalFrontend<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            broken: false,
        }
    }

    /// Print `text` (no newline) and read one trimmed line.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` on end of input or a broken stream.
    pub fn prompt(&mut self, text: &str) -> Result<String, FrontendClosed> {
        if self.broken {
            return Err(FrontendClosed);
        }
        if write!(self.output, "{text}")
            .and_then(|()| self.output.flush())
            .is_err()
        {
            self.broken = true;
            return Err(FrontendClosed);
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => Err(FrontendClosed),
            Ok(_) => Ok(line.trim().to_string()),
        }
    }

    /// Print one line.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` once the output stream has failed.
    pub fn say(&mut self, text: &str) -> Result<(), FrontendClosed> {
        if self.broken || writeln!(self.output, "{text}").is_err() {
            self.broken = true;
            return Err(FrontendClosed);
        }
        Ok(())
    }

    /// Title menu. `true` means load the saved run.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` on end of input.
    pub fn ask_resume(&mut self) -> Result<bool, FrontendClosed> {
        self.say("1) 最初から\n2) ロード")?;
        Ok(self.prompt("> ")? == "2")
    }

    fn ask_job(&mut self) -> Result<Job, FrontendClosed> {
        loop {
            for (idx, job) in Job::ALL.iter().enumerate() {
                self.say(&format!("{}. {job}", idx + 1))?;
            }
            let answer = self.prompt("職業を選択: ")?;
            match answer.parse::<Job>() {
                Ok(job) => return Ok(job),
                Err(_) => self.say("もう一度入力してください")?,
            }
        }
    }

    /// Item submenu. `None` means nothing was picked, either because the bag
    /// is empty or the player backed out.
    fn ask_item(&mut self, view: &BattleView<'_>) -> Result<Option<ItemId>, FrontendClosed> {
        let usable = view.inventory.usable();
        if usable.is_empty() {
            self.say("アイテムがない")?;
            return Ok(None);
        }
        for (idx, (item, count)) in usable.iter().enumerate() {
            self.say(&format!("{}. {item} x{count}", idx + 1))?;
        }
        let answer = self.prompt("使うアイテムを選択: ")?;
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| usable.get(idx))
            .map(|(item, _)| *item);
        if picked.is_none() {
            self.say("キャンセル")?;
        }
        Ok(picked)
    }
}

impl<R: BufRead, W: Write> Frontend for TerminalFrontend<R, W> {
    fn request_party_creation(&mut self, size: usize) -> Result<Vec<(String, Job)>, FrontendClosed> {
        self.say("--- キャラ作成 ---")?;
        let mut roster = Vec::with_capacity(size);
        for slot in 1..=size {
            let name = loop {
                let name = self.prompt(&format!("キャラ{slot}の名前: "))?;
                if !name.is_empty() {
                    break name;
                }
                self.say("もう一度入力してください")?;
            };
            let job = self.ask_job()?;
            roster.push((name, job));
        }
        Ok(roster)
    }

    fn request_character_action(
        &mut self,
        view: &BattleView<'_>,
    ) -> Result<ActionChoice, FrontendClosed> {
        let character = view.character;
        loop {
            self.say(&format!(
                "\n{}のターン HP:{}/{} MP:{}/{}",
                character.name.bold(),
                character.hp,
                character.stats.hp,
                character.mp,
                character.max_mp()
            ))?;
            self.say(&format!(
                "{} HP:{}/{}",
                view.enemy.name.red(),
                view.enemy.hp(),
                view.enemy.max_hp()
            ))?;
            self.say(&format!(
                "1. 攻撃 2. 防御 3. アイテム 4. 逃げる (成功率 {:.0}%)",
                view.escape_chance * 100.0
            ))?;
            match self.prompt("> ")?.as_str() {
                "1" => return Ok(ActionChoice::Attack),
                "2" => return Ok(ActionChoice::Defend),
                "3" => {
                    if let Some(item) = self.ask_item(view)? {
                        return Ok(ActionChoice::UseItem(item));
                    }
                }
                "4" => return Ok(ActionChoice::Escape),
                _ => self.say("もう一度入力してください")?,
            }
        }
    }

    fn notify(&mut self, event: &GameEvent) {
        let Some(line) = narrate(event) else {
            return;
        };
        let line = match event {
            GameEvent::LevelUp { .. } | GameEvent::RunFinished { .. } => {
                line.bright_yellow().bold().to_string()
            }
            GameEvent::PartyWiped | GameEvent::CharacterFell { .. } => line.red().to_string(),
            _ => line,
        };
        if self.say(&line).is_err() {
            log::debug!("terminal output closed while narrating");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_game::{Character, EnemyKind, Inventory};
    use std::io::Cursor;

    fn frontend(script: &str) -> TerminalFrontend<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        TerminalFrontend::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn output(frontend: &TerminalFrontend<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(&frontend.output).into_owned()
    }

    #[test]
    fn party_creation_reprompts_bad_jobs_and_blank_names() {
        let mut term = frontend("\nアレン\n9\n1\nセラ\n神官\n");
        let roster = term.request_party_creation(2).unwrap();
        assert_eq!(
            roster,
            vec![("アレン".to_string(), Job::Warrior), ("セラ".to_string(), Job::Priest)]
        );
        assert_eq!(output(&term).matches("もう一度入力してください").count(), 2);
    }

    #[test]
    fn action_menu_maps_numbers_and_item_submenu() {
        let character = Character::new("アレン", Job::Warrior);
        let enemy = EnemyKind::Slime.spawn();
        let inventory = Inventory::starting();
        let party = [character.clone()];
        let view = BattleView {
            character: &character,
            enemy: &enemy,
            escape_chance: 0.25,
            inventory: &inventory,
            party: &party,
        };
        let mut term = frontend("x\n3\n9\n3\n2\n4\n");
        assert_eq!(
            term.request_character_action(&view),
            Ok(ActionChoice::UseItem(ItemId::HiPotion))
        );
        assert_eq!(term.request_character_action(&view), Ok(ActionChoice::Escape));
        let text = output(&term);
        assert!(text.contains("キャンセル"));
        assert!(text.contains("成功率 25%"));
        assert_eq!(term.request_character_action(&view), Err(FrontendClosed));
    }

    #[test]
    fn empty_bag_returns_to_the_action_menu() {
        let character = Character::new("アレン", Job::Warrior);
        let enemy = EnemyKind::Slime.spawn();
        let inventory = Inventory::empty();
        let party = [character.clone()];
        let view = BattleView {
            character: &character,
            enemy: &enemy,
            escape_chance: 0.25,
            inventory: &inventory,
            party: &party,
        };
        let mut term = frontend("3\n1\n");
        assert_eq!(term.request_character_action(&view), Ok(ActionChoice::Attack));
        let text = output(&term);
        assert!(text.contains("アイテムがない"));
        assert_eq!(text.matches("1. 攻撃").count(), 2);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_output_closes_even_with_input_left() {
        let mut term = TerminalFrontend::new(Cursor::new(b"1\n2\n".to_vec()), BrokenPipe);
        assert_eq!(term.say("hello"), Err(FrontendClosed));
        assert_eq!(term.prompt("> "), Err(FrontendClosed));
        assert_eq!(term.ask_resume(), Err(FrontendClosed));

        let mut term = TerminalFrontend::new(Cursor::new(b"1\n".to_vec()), BrokenPipe);
        term.notify(&GameEvent::PartyWiped);
        assert_eq!(term.prompt("> "), Err(FrontendClosed));
    }

    #[test]
    fn end_of_input_closes() {
        let mut term = frontend("");
        assert_eq!(term.request_party_creation(4), Err(FrontendClosed));
        assert_eq!(term.ask_resume(), Err(FrontendClosed));
    }
}
