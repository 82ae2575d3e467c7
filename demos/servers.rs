use std::time::Duration;

use chrono::{DateTime, Utc};
use confbind::{ConfigError, Document};

confbind::record! {
    #[derive(Debug, Default)]
    struct AppSection {
        name: String => { conf = "app.name,required" },
        debug: bool => { conf = "app.debug" },
        shutdown_grace: Duration => { conf = "app.shutdown_grace" },
        started: DateTime<Utc> => { conf = "app.started" },
        tags: Vec<String> => { conf = "app.tags" },
    }
}

confbind::record! {
    #[derive(Debug, Default)]
    struct Server {
        host: String => { conf = "host,required" },
        port: u16 => { conf = "port,required" },
        weight: u8 => { conf = "weight" },
        timeout: Duration => { conf = "timeout" },
    }
}

fn main() -> Result<(), ConfigError> {
    let doc = Document::open(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/servers.toml"))?;

    let mut app = AppSection::default();
    doc.bind(&mut app, None)?;
    println!("{app:#?}");

    let Some(mut servers) = doc.array("server")? else {
        println!("no servers configured");
        return Ok(());
    };
    loop {
        let mut server = Server::default();
        match servers.bind(&mut server, None) {
            Ok(()) => println!("{server:?}"),
            Err(e) if e.is_end_of_array() => break,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
