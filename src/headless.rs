//! Line-mode input for stations without a terminal UI
//!
//! Each line read from the source is fed to the station as the key presses a
//! keyboard-wedge scanner would emit: its characters, then the terminator.
//! Keys sent while a scan is processing would be discarded, so the next line
//! is only fed once the previous scan went through and the station is idle.

use {
    crate::{
        aggregator::{StationError, StationHandle},
        input::keys_for_line,
        state::StationView,
    },
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt},
        sync::watch,
    },
};

/// Feed every line of `reader` to the station until EOF
///
/// Returns the number of lines that carried a code. Blank lines are skipped.
/// Stops early if the session closes.
pub async fn feed_lines<R>(reader: R, station: &StationHandle) -> Result<usize, StationError>
where
    R: AsyncBufRead + Unpin,
{
    let mut view = station.subscribe();
    let mut lines = reader.lines();
    let mut fed = 0;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read input line: {}", e);
                break;
            }
        };

        let keys = keys_for_line(&line);
        if !keys.iter().any(|key| key.printable().is_some()) {
            continue;
        }

        wait_for(&mut view, |v| !v.is_busy()).await?;
        let scans_before = view.borrow().stats.scans;

        for key in keys {
            station.key(key)?;
        }

        // The terminator flushes synchronously, so the scan count moves
        // as soon as the aggregator has handled this line
        wait_for(&mut view, |v| v.stats.scans > scans_before).await?;
        fed += 1;
    }

    log::debug!("Input exhausted after {} lines", fed);
    Ok(fed)
}

async fn wait_for(
    view: &mut watch::Receiver<StationView>,
    condition: impl FnMut(&StationView) -> bool,
) -> Result<(), StationError> {
    view.wait_for(condition)
        .await
        .map(|_| ())
        .map_err(|_| StationError::Closed)
}
