//! Player-facing text for engine events.
use delve_game::{GameEvent, ItemEffect, RunOutcome};

/// One line of narration, or `None` for events the terminal stays quiet about.
#[must_use]
pub fn narrate(event: &GameEvent) -> Option<String> {
    let line = match event {
        GameEvent::RunStarted { .. } => "パーティを作成しました。\nゲーム開始！".to_string(),
        GameEvent::RunLoaded { floor } => format!("ゲームをロードしました。({floor}階から再開)"),
        GameEvent::NoSaveFound => "セーブデータがありません。".to_string(),
        GameEvent::PartyRejected { reason } => format!("パーティを作成できません: {reason}"),
        GameEvent::FloorEntered { floor } => format!("\n-- {floor}階 --"),
        GameEvent::TreasureFound { item } => format!("宝箱を見つけた！ {item}を手に入れた。"),
        GameEvent::Rested => "回復ポイントだ！ HPが全回復した。".to_string(),
        GameEvent::EncounterBegan { enemy, boss: true } => format!("{enemy}が現れた！"),
        GameEvent::EncounterBegan { enemy, boss: false } => format!("{enemy}との戦闘！"),
        GameEvent::EnemyAttacked {
            enemy,
            target,
            damage,
        } => format!("{enemy}の攻撃！ {target}に{damage}のダメージ"),
        GameEvent::CharacterFell { name } => format!("{name}は倒れた…"),
        GameEvent::CharacterAttacked {
            actor,
            enemy,
            damage,
        } => format!("{actor}の攻撃！ {enemy}に{damage}のダメージ"),
        GameEvent::Defended { actor } => format!("{actor}は身を守っている"),
        GameEvent::ItemUsed { actor, item, effect } => match effect {
            ItemEffect::Healed { target, amount } => {
                format!("{actor}は{item}を使った！ {target}のHPが{amount}回復した")
            }
            ItemEffect::Damaged { target, amount } => {
                format!("{actor}は{item}を使った！ {target}に{amount}のダメージを与えた")
            }
        },
        GameEvent::EscapeAttempted { success: true, .. } => "逃げ出した！".to_string(),
        GameEvent::EscapeAttempted { success: false, .. } => "逃げられなかった".to_string(),
        GameEvent::ActionRejected { .. } => "アイテムがない".to_string(),
        GameEvent::EnemyDefeated { enemy } => format!("{enemy}を倒した！"),
        GameEvent::ExperienceGained { .. } => return None,
        GameEvent::LevelUp { name, level } => format!("{name}はレベル{level}に上がった！"),
        GameEvent::PartyWiped => "全滅しました...".to_string(),
        GameEvent::CheckpointSaved { .. } => "ゲームを保存しました。".to_string(),
        GameEvent::RunFinished {
            outcome: RunOutcome::Victory,
        } => "ボスを倒した！ ゲームクリア！".to_string(),
        GameEvent::RunFinished {
            outcome: RunOutcome::Defeat,
        } => "ゲームオーバー".to_string(),
    };
    Some(line)
}
