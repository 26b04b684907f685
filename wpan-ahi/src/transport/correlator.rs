use core::ops::Range;

use embedded_hal_async::delay::DelayNs;
use wpan_frame::{HeaderInformationElementRepr, MAX_FRAME_LEN};

use super::{Clock, EventHandler, Link, Uart};
use crate::ahi::{completion, CcaMode, Command, Message, ResponseToken, TxDone};
use crate::config::{Config, KEY_STORE_CAPACITY};
use crate::security::{self, KeyDescriptor, KeyStore, TxFrame};
use crate::sync::{with_timeout, Mutex};
use crate::{Error, Result};

struct Inner<U, D> {
    uart: U,
    delay: D,
    tx: Message,
    keys: KeyStore,
    config: Config,
    firmware_version: Option<u32>,
}

impl<U: Uart, D: DelayNs> Inner<U, D> {
    /// Send `command` and wait for the message completing it.
    async fn request<H: EventHandler, C: Clock>(
        &mut self,
        link: &Link<H, C>,
        command: &Command<'_>,
    ) -> Result<Message> {
        command.emit(&mut self.tx)?;
        let token = command.response();
        debug!("ahi: request {}", u16::from(command.opcode()));

        link.expect(token);

        if let Err(_err) = self.uart.write(self.tx.as_bytes()).await {
            link.abandon();
            error!("ahi: UART write failed");
            return Err(Error::Transport);
        }

        match with_timeout(&mut self.delay, self.config.response_timeout, link.response()).await {
            Ok(response) => response,
            Err(_) => {
                link.abandon();
                warn!(
                    "ahi: no response to {} within {}",
                    token.msg,
                    self.config.response_timeout
                );
                Err(Error::TransportTimeout)
            }
        }
    }

    /// Send `command` and check the status of its completion.
    async fn execute<H: EventHandler, C: Clock>(
        &mut self,
        link: &Link<H, C>,
        command: &Command<'_>,
    ) -> Result<()> {
        let response = self.request(link, command).await?;
        completion(&response)?;
        Ok(())
    }
}

/// The send side of the link to the companion core.
///
/// Every operation holds a lock from the moment the command is built until
/// its response arrived or the response timeout expired: a single request is
/// ever in flight, and the response to it is recognized by its
/// [`ResponseToken`] alone. The [`KeyStore`] is only accessed under the same
/// lock.
///
/// The correlator is `Sync` when its UART and timer are `Send`: callers on
/// several tasks or threads share it by reference, or through a `static`.
pub struct Correlator<'l, U, D, H: EventHandler, C: Clock> {
    link: &'l Link<H, C>,
    inner: Mutex<Inner<U, D>>,
}

impl<'l, U: Uart, D: DelayNs, H: EventHandler, C: Clock> Correlator<'l, U, D, H, C> {
    /// Create a correlator sending over `uart` and receiving through `link`.
    pub fn new(link: &'l Link<H, C>, uart: U, delay: D, config: Config) -> Self {
        Self {
            link,
            inner: Mutex::new(Inner {
                uart,
                delay,
                tx: Message::new(ResponseToken::new(0, 0)),
                keys: KeyStore::new(),
                config,
                firmware_version: None,
            }),
        }
    }

    /// Return the receive side.
    pub fn link(&self) -> &'l Link<H, C> {
        self.link
    }

    /// Send a command and return the message completing it, whatever its
    /// status.
    pub async fn request(&self, command: &Command<'_>) -> Result<Message> {
        self.inner.lock().await.request(self.link, command).await
    }

    async fn execute(&self, command: Command<'_>) -> Result<()> {
        self.inner.lock().await.execute(self.link, &command).await
    }

    /// Reset the companion core.
    pub async fn reset(&self) -> Result<()> {
        self.execute(Command::Reset).await
    }

    /// Read the firmware version of the companion core.
    ///
    /// Reports of the security of the ACKs sent by the companion core are
    /// only decoded once the version is known to support them.
    pub async fn version(&self) -> Result<u32> {
        let mut inner = self.inner.lock().await;
        let response = inner.request(self.link, &Command::VersionGet).await?;
        let version = completion(&response)?.u32()?;

        inner.firmware_version = Some(version);
        let ack_security = version >= inner.config.ack_security_min_version;
        self.link.set_ack_security(ack_security);
        info!("ahi: firmware version {}", version);

        Ok(version)
    }

    /// Return the firmware version read by [`Correlator::version`].
    pub async fn firmware_version(&self) -> Option<u32> {
        self.inner.lock().await.firmware_version
    }

    /// Set the short address.
    pub async fn set_short_address(&self, address: u16) -> Result<()> {
        self.execute(Command::ShortAddressSet(address)).await
    }

    /// Set the extended address, in over-the-air order. It is also the source
    /// address of the nonce of the frames secured by [`Correlator::transmit`].
    pub async fn set_ext_address(&self, address: [u8; 8]) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .execute(self.link, &Command::ExtAddressSet(address))
            .await?;
        inner.config.ext_address = address;
        Ok(())
    }

    /// Set the PAN ID.
    pub async fn set_pan_id(&self, pan_id: u16) -> Result<()> {
        self.execute(Command::PanIdSet(pan_id)).await
    }

    /// Set the channel.
    pub async fn set_channel(&self, channel: u8) -> Result<()> {
        self.execute(Command::ChannelSet(channel)).await
    }

    /// Add a short address to the pending-bit table.
    pub async fn pending_short_add(&self, address: u16) -> Result<()> {
        self.execute(Command::PendingShortAdd(address)).await
    }

    /// Remove a short address from the pending-bit table.
    pub async fn pending_short_remove(&self, address: u16) -> Result<()> {
        self.execute(Command::PendingShortRemove(address)).await
    }

    /// Add an extended address to the pending-bit table.
    pub async fn pending_ext_add(&self, address: [u8; 8]) -> Result<()> {
        self.execute(Command::PendingExtAdd(address)).await
    }

    /// Remove an extended address from the pending-bit table.
    pub async fn pending_ext_remove(&self, address: [u8; 8]) -> Result<()> {
        self.execute(Command::PendingExtRemove(address)).await
    }

    /// Empty the pending-bit table.
    pub async fn pending_clear(&self) -> Result<()> {
        self.execute(Command::PendingClear).await
    }

    /// Enable or disable the automatic frame pending bit.
    pub async fn set_auto_pending(&self, enabled: bool) -> Result<()> {
        self.execute(Command::AutoPendingSet(enabled)).await
    }

    /// Set the CCA mode.
    pub async fn set_cca_mode(&self, mode: CcaMode) -> Result<()> {
        self.execute(Command::CcaModeSet(mode)).await
    }

    /// Set the energy threshold of the CCA, in dBm.
    pub async fn set_cca_threshold(&self, dbm: i8) -> Result<()> {
        self.execute(Command::CcaThresholdSet(dbm)).await
    }

    /// Set the transmit power, in dBm.
    pub async fn set_tx_power(&self, dbm: i8) -> Result<()> {
        self.execute(Command::TxPowerSet(dbm)).await
    }

    /// Start receiving.
    pub async fn rx_start(&self) -> Result<()> {
        self.execute(Command::RxStart).await
    }

    /// Stop receiving.
    pub async fn rx_stop(&self) -> Result<()> {
        self.execute(Command::RxStop).await
    }

    /// Measure the energy on the channel, in dBm.
    pub async fn energy_detect(&self, duration_us: u32) -> Result<i8> {
        let response = self.request(&Command::EnergyDetect { duration_us }).await?;
        completion(&response)?.i8()
    }

    /// Secure `frame` if needed, and transmit it.
    ///
    /// The frame is secured only once: a frame that failed to be sent can be
    /// passed again without advancing the frame counter. The recorded header
    /// is written back before every attempt.
    pub async fn transmit(&self, frame: &mut TxFrame, cca: bool) -> Result<TxDone> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        security::encode(frame, &mut inner.keys, &inner.config.ext_address)?;
        if frame.is_encoded() {
            frame.restore_header();
        }

        let command = Command::Transmit {
            frame: frame.as_bytes(),
            cca,
        };
        let response = inner.request(self.link, &command).await?;
        TxDone::parse(&mut completion(&response)?)
    }

    /// Verify and decrypt a received frame in place with the configured keys.
    /// See [`security::decrypt`].
    pub async fn decrypt(
        &self,
        frame: &mut [u8],
        peer_ext_address: Option<&[u8; 8]>,
    ) -> Result<Range<usize>> {
        let inner = self.inner.lock().await;
        security::decrypt(frame, &inner.keys, peer_ext_address)
    }

    /// Replace the security keys, here and in the companion core.
    ///
    /// # Errors
    ///
    /// [`Error::KeyStoreFull`] without contacting the companion core if there
    /// are more keys than the key store can hold. The local keys are left
    /// untouched when the companion core refuses them.
    pub async fn set_keys(&self, keys: &[KeyDescriptor]) -> Result<()> {
        if keys.len() > KEY_STORE_CAPACITY {
            return Err(Error::KeyStoreFull);
        }

        let mut inner = self.inner.lock().await;
        inner.execute(self.link, &Command::KeysSet(keys)).await?;
        inner.keys.set(keys)
    }

    /// Remove every security key, here and in the companion core.
    pub async fn clear_keys(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.execute(self.link, &Command::KeysClear).await?;
        inner.keys.clear();
        Ok(())
    }

    /// Return a copy of the configured keys.
    pub async fn keys(&self) -> heapless::Vec<KeyDescriptor, KEY_STORE_CAPACITY> {
        let inner = self.inner.lock().await;
        inner.keys.keys().iter().cloned().collect()
    }

    /// Return the next value of the shared frame counter.
    pub async fn frame_counter(&self) -> u32 {
        self.inner.lock().await.keys.frame_counter()
    }

    /// Set the shared frame counter, here and in the companion core.
    pub async fn set_frame_counter(&self, frame_counter: u32) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .execute(self.link, &Command::FrameCounterSet(frame_counter))
            .await?;
        inner.keys.set_frame_counter(frame_counter);
        Ok(())
    }

    /// Set the shared frame counter, unless it would decrease.
    ///
    /// # Errors
    ///
    /// [`Error::CounterDecrease`] without contacting the companion core if
    /// `frame_counter` is lower than the local counter.
    pub async fn set_frame_counter_if_larger(&self, frame_counter: u32) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if frame_counter < inner.keys.frame_counter() {
            return Err(Error::CounterDecrease);
        }
        inner
            .execute(self.link, &Command::FrameCounterSetIfLarger(frame_counter))
            .await?;
        inner.keys.set_frame_counter_if_larger(frame_counter)
    }

    /// Set the header IEs the companion core injects into the enhanced ACKs
    /// it sends to a peer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMessage`] if the elements do not fit in a frame.
    pub async fn set_header_ies(
        &self,
        short_address: u16,
        ext_address: [u8; 8],
        ies: &[HeaderInformationElementRepr<'_>],
    ) -> Result<()> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let mut len = 0;
        for ie in ies {
            len += ie
                .emit(&mut buffer[len..])
                .map_err(|_| Error::InvalidMessage)?;
        }

        self.execute(Command::HeaderIeSet {
            short_address,
            ext_address,
            ies: &buffer[..len],
        })
        .await
    }

    /// Stop injecting header IEs into the enhanced ACKs sent to a peer.
    pub async fn purge_header_ies(&self, short_address: u16, ext_address: [u8; 8]) -> Result<()> {
        self.execute(Command::HeaderIePurge {
            short_address,
            ext_address,
        })
        .await
    }

    /// Set the CSL period, in units of 10 symbols.
    pub async fn set_csl_period(&self, period: u16) -> Result<()> {
        self.execute(Command::CslPeriodSet(period)).await
    }

    /// Schedule a receive slot.
    pub async fn set_rx_slot(&self, start_us: u32, duration_us: u32, channel: u8) -> Result<()> {
        self.execute(Command::RxSlotSet {
            start_us,
            duration_us,
            channel,
        })
        .await
    }
}
