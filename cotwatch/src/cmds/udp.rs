use eyre::Result;
use tracing::trace;

use cotwatch_engine::{Stats, UdpSource};

use crate::{new_watcher, Listen, Settings};

/// Listen until killed.  Only a fatal socket error makes this return.
///
#[tracing::instrument]
pub fn listen_udp(settings: &Settings, listen: &Listen, kml_every: usize) -> Result<Stats> {
    trace!("listen_udp");

    let mut src = match listen.mcast {
        Some(group) => {
            let src = UdpSource::multicast(group, listen.bind, listen.port)?;
            println!("[*] Listening multicast {}:{}", group, listen.port);
            src
        }
        None => {
            let src = UdpSource::bind(listen.bind, listen.port)?;
            println!("[*] Listening UDP {}:{}", listen.bind, listen.port);
            src
        }
    };

    let mut w = new_watcher(settings, kml_every)?;
    let res = w.run(&mut src);
    let stats = w.finish()?;
    res.map(|_| stats)
}
