use std::{path::PathBuf, thread, time::Instant};

use anyhow::bail;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use treasure::{config::HuntConfig, Grid, Hunter, Tick};

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => HuntConfig::load(&PathBuf::from(path))?,
        None => HuntConfig::default(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let grid = Grid::generate_solvable(
        config.width,
        config.height,
        config.wall_density,
        &mut rng,
        config.max_attempts,
    )?;
    println!("{}", grid);

    let mut hunter = Hunter::new(grid, config.move_delay())?;
    info!("following a path of {} cells", hunter.path().len());

    let started = Instant::now();
    loop {
        match hunter.tick(started.elapsed()) {
            Tick::Waiting => {}
            Tick::Moved(_) | Tick::Found(_) => println!("{}", hunter.grid()),
            Tick::Stuck => bail!(
                "no path from {} to the treasure",
                hunter.grid().player_pos()
            ),
        }

        // checked every frame, a maze whose start is the treasure ends on the first one
        if hunter.is_finished() {
            // show the final state briefly
            thread::sleep(config.hold());
            return Ok(());
        }

        thread::sleep(config.frame_time());
    }
}
