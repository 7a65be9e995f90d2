use color_eyre::Result;

mod app;
mod cli;
mod errors;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    errors::install_hooks()?;

    let args = cli::Args::parse_args();

    if let Some(ref data_dir) = args.data_dir {
        // SAFETY: This is called at program startup before any other threads exist
        unsafe {
            std::env::set_var("PDA_BANK_DATA", data_dir);
        }
    }

    logging::init()?;

    let mut app = app::App::new(&args)?;

    app.run().await?;

    Ok(())
}
