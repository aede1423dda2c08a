//! One client's login and menu flow.
use crate::protocol::Connection;
use crate::registry::Registry;
use delve_game::{Character, Job, Stats};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite};

/// Job menu offered over the network, 0-based.
pub const NETWORK_JOBS: [Job; 5] = [
    Job::Warrior,
    Job::Priest,
    Job::Mage,
    Job::Spellblade,
    Job::Thief,
];

const TOWN_MENU: &str = "\n-- 街 --\n1) 道具屋\n2) 武器防具屋\n3) アクセサリー屋\n4) 魔法屋\n5) 酒場(マッチ用ロビー)\n0) 戻る\n> ";
const MAIN_MENU: &str = "\n-- メインメニュー --\n1) 街\n2) ダンジョン\n3) ステータス\n4) 終了\n> ";

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Disconnected,
    InvalidJob,
    ServerFull,
}

#[derive(Serialize)]
struct Status<'a> {
    name: &'a str,
    job: Job,
    level: u32,
    stats: &'a Stats,
}

/// Pretty JSON status line for `player`.
#[must_use]
pub fn status_json(player: &Character) -> String {
    let status = Status {
        name: &player.name,
        job: player.job,
        level: player.level,
        stats: &player.stats,
    };
    serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
}

fn job_menu() -> String {
    let mut menu: String = NETWORK_JOBS
        .iter()
        .enumerate()
        .map(|(idx, job)| format!("{idx}) {job}\n"))
        .collect();
    menu.push_str("職業を選んでください:");
    menu
}

fn parse_job(answer: &str) -> Option<Job> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|idx| NETWORK_JOBS.get(idx).copied())
}

/// Drive one connection until the player quits or hangs up.
///
/// # Errors
///
/// Returns I/O errors from the underlying stream.
pub async fn run_session<R, W>(
    conn: &mut Connection<R, W>,
    registry: &Registry,
) -> std::io::Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    conn.send("ようこそ！ 名前を入力してください:").await?;
    let name = match conn.recv().await? {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => return Ok(SessionEnd::Disconnected),
    };

    conn.send(&job_menu()).await?;
    let Some(answer) = conn.recv().await? else {
        return Ok(SessionEnd::Disconnected);
    };
    let Some(job) = parse_job(&answer) else {
        conn.send("不正な入力です").await?;
        return Ok(SessionEnd::InvalidJob);
    };

    let seat = match registry.join() {
        Ok(seat) => seat,
        Err(err) => {
            log::info!("{name} turned away: {err}");
            conn.send("サーバが満員です").await?;
            return Ok(SessionEnd::ServerFull);
        }
    };
    let player = Character::new(name, job);
    log::info!("{} logged in as {} ({} online)", player.name, job.ident(), registry.len());
    conn.send(&format!("{} としてログインしました。", player.name))
        .await?;

    let end = main_menu(conn, &player).await;
    seat.leave();
    if registry.is_empty() {
        log::info!("{} left; lobby is empty", player.name);
    } else {
        log::info!("{} left ({} online)", player.name, registry.len());
    }
    end
}

async fn main_menu<R, W>(conn: &mut Connection<R, W>, player: &Character) -> std::io::Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        conn.send(MAIN_MENU).await?;
        let Some(cmd) = conn.recv().await? else {
            return Ok(SessionEnd::Disconnected);
        };
        match cmd.trim() {
            "1" => town(conn).await?,
            "2" => {
                conn.send("\n-- ダンジョン --").await?;
                conn.send("ダンジョンを探索し、帰ってきました。").await?;
            }
            "3" => conn.send(&status_json(player)).await?,
            "4" => return Ok(SessionEnd::Quit),
            _ => conn.send("不明なコマンドです").await?,
        }
    }
}

/// Shop stubs; `0` or a hang-up returns to the main menu.
async fn town<R, W>(conn: &mut Connection<R, W>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        conn.send(TOWN_MENU).await?;
        match conn.recv().await?.as_deref().map(str::trim) {
            None | Some("0") => return Ok(()),
            Some(_) => conn.send("現在は利用できません").await?,
        }
    }
}
