use anyhow::{Context, Result, bail};
use vestige_toll::character::{CharacterId, HpUpdate, TargetContext, UpdateTag};
use vestige_toll::host::{CharacterStore, Notifier};
use vestige_toll::ledger;
use vestige_toll::logging;
use vestige_toll::memory::MemoryHost;
use vestige_toll::message::Notification;
use vestige_toll::rest::RestReport;
use vestige_toll::save::WorldFile;
use vestige_toll::settings::Settings;
use vestige_toll::vestige::Vestige;

const USAGE: &str =
    "usage: vestige <world.json> <character-id> <status | toll <n> | heal <n> | damage <n> | rest | discharge>";

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        println!("[{}] {}", notification.level, notification.content);
    }

    fn whisper(&self, report: &RestReport) {
        println!("{}", report);
    }
}

fn amount_arg(rest: &[String], command: &str) -> Result<i32> {
    let raw = rest
        .first()
        .with_context(|| format!("{} needs an amount\n{}", command, USAGE))?;
    let amount: i32 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", raw))?;
    if amount < 0 {
        bail!("amount must not be negative");
    }
    Ok(amount)
}

async fn print_status(vestige: &Vestige<MemoryHost, ConsoleNotifier>, id: &CharacterId) -> Result<()> {
    let snapshot = vestige.host().snapshot(id).await?;
    let hp = snapshot.hp;
    match ledger::load(vestige.host(), id, hp.max).await? {
        Some(toll) => println!(
            "{}: {}/{} HP (max {}), {} temp, toll {}",
            snapshot.name, hp.value, toll.effective_max_hp, hp.max, hp.temp, toll.total_toll
        ),
        None => println!("{}: {}/{} HP, {} temp, no toll", snapshot.name, hp.value, hp.max, hp.temp),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    if let Err(err) =
        logging::default_log_dir().and_then(|dir| logging::init(dir, settings.debug_mode))
    {
        eprintln!("logging disabled: {}", err);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [world_path, character, command, rest @ ..] = args.as_slice() else {
        bail!(USAGE);
    };

    let world = WorldFile::load_from_file(world_path)
        .with_context(|| format!("failed to load world file {}", world_path))?;
    let host = MemoryHost::from_world(world).with_vestige_hook();
    let vestige = Vestige::new(host, ConsoleNotifier, settings);

    let id = CharacterId::new(character.as_str());
    let target = TargetContext::assigned(id.clone());

    match command.as_str() {
        "status" => {}
        "toll" => {
            let input = rest.first().with_context(|| format!("toll needs an amount\n{}", USAGE))?;
            vestige.apply_toll_input(&target, input).await?;
        }
        "heal" => {
            let amount = amount_arg(rest, "heal")?;
            let hp = vestige.host().snapshot(&id).await?.hp;
            vestige
                .host()
                .update_hit_points(&id, HpUpdate::heal(hp, amount), UpdateTag::Untagged)
                .await?;
        }
        "damage" => {
            let amount = amount_arg(rest, "damage")?;
            let hp = vestige.host().snapshot(&id).await?.hp;
            let update = HpUpdate::damage(hp, amount);
            vestige
                .host()
                .update_hit_points(&id, update, UpdateTag::Untagged)
                .await?;
        }
        "rest" => {
            vestige.perform_rest(&target).await?;
        }
        "discharge" => {
            vestige.discharge(&target).await?;
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }

    print_status(&vestige, &id).await?;
    vestige
        .host()
        .to_world()
        .await
        .save_to_file(world_path)
        .with_context(|| format!("failed to save world file {}", world_path))?;
    Ok(())
}
