use anyhow::Result;
use nowcast::initialization::init;
use nowcast::worker;

fn main() -> Result<()> {
    let (config, openweather, store, trainer) = init()?;

    worker::run(&config, &openweather, &store, &trainer);

    Ok(())
}
