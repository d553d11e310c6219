//! End-to-end register transaction tests for the SX127x driver core.
//!
//! A mock HAL backs the driver with an in-memory register image plus a
//! simulated packet FIFO, so every test can assert the exact bytes the driver
//! puts on the bus and simulate interrupt flags the way the silicon would
//! raise them.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sx127x_rs::modulation::{
    AddressFiltering, Bandwidth, CodingRate, CrcType, FskDataShaping, LnaGain, OokAverageOffset,
    OokAverageThreshFilt, OokDataShaping, OokPeakThreshDec, OokPeakThreshStep, PaPin, PaRamp,
    PacketEncoding, PacketFormat, PreambleType, RssiSmoothing, RxTrigger, SpreadingFactor,
};
use sx127x_rs::registers::*;
use sx127x_rs::{
    DriverError, Hal, HalError, ImplicitHeader, Modulation, OperatingMode, Sx127xDriver, TxHeader,
};

struct RadioState {
    registers: [u8; 128],
    /// Bytes the driver burst-wrote to the FIFO
    fifo_out: Vec<u8>,
    /// Bytes served to the driver on FIFO burst reads
    fifo_in: Vec<u8>,
    /// Log of every single-register write, in order
    writes: Vec<(u8, u8)>,
    fail: bool,
}

impl RadioState {
    fn new() -> Self {
        let mut registers = [0u8; 128];
        registers[REG_VERSION as usize] = CHIP_VERSION;
        Self {
            registers,
            fifo_out: Vec::new(),
            fifo_in: Vec::new(),
            writes: Vec::new(),
            fail: false,
        }
    }
}

#[derive(Clone)]
struct MockHal(Rc<RefCell<RadioState>>);

impl Hal for MockHal {
    fn read_register(&mut self, addr: u8) -> Result<u8, HalError> {
        let state = self.0.borrow();
        if state.fail {
            return Err(HalError::Spi);
        }
        Ok(state.registers[addr as usize])
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), HalError> {
        let mut state = self.0.borrow_mut();
        if state.fail {
            return Err(HalError::Spi);
        }
        state.registers[addr as usize] = value;
        state.writes.push((addr, value));
        Ok(())
    }

    fn burst_read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), HalError> {
        let mut state = self.0.borrow_mut();
        if state.fail {
            return Err(HalError::Spi);
        }
        if addr == REG_FIFO {
            // an understocked FIFO reads back as a bus failure
            if state.fifo_in.len() < buf.len() {
                return Err(HalError::Spi);
            }
            let drained: Vec<u8> = state.fifo_in.drain(..buf.len()).collect();
            buf.copy_from_slice(&drained);
        } else {
            for (offset, byte) in buf.iter_mut().enumerate() {
                *byte = state.registers[addr as usize + offset];
            }
        }
        Ok(())
    }

    fn burst_write(&mut self, addr: u8, data: &[u8]) -> Result<(), HalError> {
        let mut state = self.0.borrow_mut();
        if state.fail {
            return Err(HalError::Spi);
        }
        if addr == REG_FIFO {
            state.fifo_out.extend_from_slice(data);
        } else {
            for (offset, byte) in data.iter().enumerate() {
                state.registers[addr as usize + offset] = *byte;
            }
        }
        Ok(())
    }
}

fn new_radio() -> (Sx127xDriver<MockHal>, Rc<RefCell<RadioState>>) {
    let state = Rc::new(RefCell::new(RadioState::new()));
    let driver = Sx127xDriver::new(MockHal(state.clone())).expect("version probe");
    (driver, state)
}

fn reg(state: &Rc<RefCell<RadioState>>, addr: u8) -> u8 {
    state.borrow().registers[addr as usize]
}

#[test]
fn construction_rejects_wrong_version() {
    let state = Rc::new(RefCell::new(RadioState::new()));
    state.borrow_mut().registers[REG_VERSION as usize] = 0x13;
    let result = Sx127xDriver::new(MockHal(state));
    assert!(matches!(
        result,
        Err(DriverError::InvalidVersion { expected: 0x12, actual: 0x13 })
    ));
}

#[test]
fn construction_passes_transport_errors_through() {
    let state = Rc::new(RefCell::new(RadioState::new()));
    state.borrow_mut().fail = true;
    let result = Sx127xDriver::new(MockHal(state));
    assert!(matches!(result, Err(DriverError::Hal(HalError::Spi))));
}

#[test]
fn lora_configuration_writes_datasheet_values() {
    let (mut radio, state) = new_radio();

    radio.set_opmod(OperatingMode::Sleep, Modulation::Lora).unwrap();
    assert_eq!(reg(&state, REG_OP_MODE), 0b1000_0000);

    radio.set_frequency(437_200_012).unwrap();
    assert_eq!(reg(&state, REG_FRF_MSB), 0x6D);
    assert_eq!(reg(&state, REG_FRF_MID), 0x4C);
    assert_eq!(reg(&state, REG_FRF_LSB), 0xCD);

    radio.lora_reset_fifo().unwrap();
    assert_eq!(reg(&state, LORA_REG_FIFO_TX_BASE_ADDR), 0x00);
    assert_eq!(reg(&state, LORA_REG_FIFO_RX_BASE_ADDR), 0x00);

    radio.lora_set_bandwidth(Bandwidth::BW125).unwrap();
    radio.lora_set_implicit_header(None).unwrap();
    radio.lora_set_modem_config_2(SpreadingFactor::SF9).unwrap();
    radio.lora_set_syncword(18).unwrap();
    radio.lora_set_preamble_length(8).unwrap();
    radio.lora_set_low_datarate_optimization(true).unwrap();
    radio.rx_set_lna_boost_hf(true).unwrap();
    radio.rx_set_lna_gain(LnaGain::G4).unwrap();
    radio.tx_set_pa_config(PaPin::Boost, 4).unwrap();

    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_1), 0b0111_0000);
    assert_eq!(reg(&state, LORA_REG_DETECTION_OPTIMIZE), 0xC3);
    assert_eq!(reg(&state, LORA_REG_DETECTION_THRESHOLD), 0x0A);
    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_2), 0b1001_0000);
    assert_eq!(reg(&state, LORA_REG_SYNC_WORD), 18);
    assert_eq!(reg(&state, LORA_REG_PREAMBLE_MSB), 0);
    assert_eq!(reg(&state, LORA_REG_PREAMBLE_LSB), 8);
    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_3), 0b0000_1000);
    assert_eq!(reg(&state, REG_LNA), 0b1000_0011);
    assert_eq!(reg(&state, REG_PA_DAC), 0b1000_0100);
    assert_eq!(reg(&state, REG_PA_CONFIG), 0b1000_0010);
    assert_eq!(reg(&state, REG_OCP), 0x28);

    assert_eq!(radio.lora_get_bandwidth().unwrap(), 125_000);

    state.borrow_mut().registers[LORA_REG_PKT_SNR_VALUE as usize] = (-21i8) as u8;
    assert_eq!(radio.lora_rx_get_packet_snr().unwrap(), -5.25);

    state.borrow_mut().registers[LORA_REG_PKT_RSSI_VALUE as usize] = 134;
    assert_eq!(radio.rx_get_packet_rssi().unwrap(), -35);

    {
        let mut state = state.borrow_mut();
        state.registers[LORA_REG_FEI_MSB as usize] = 0x0F;
        state.registers[LORA_REG_FEI_MID as usize] = 0xFF;
        state.registers[LORA_REG_FEI_LSB as usize] = 0xF0;
    }
    assert_eq!(radio.rx_get_frequency_error().unwrap(), -2);

    radio
        .lora_tx_set_explicit_header(TxHeader {
            coding_rate: CodingRate::CR4_5,
            enable_crc: true,
        })
        .unwrap();
    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_1), 0b0111_0010);
    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_2), 0b1001_0100);
}

#[test]
fn modulation_change_passes_through_sleep() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Lora).unwrap();

    let writes: Vec<(u8, u8)> = state
        .borrow()
        .writes
        .iter()
        .filter(|(addr, _)| *addr == REG_OP_MODE)
        .copied()
        .collect();
    assert_eq!(writes, vec![(REG_OP_MODE, 0b1000_0000), (REG_OP_MODE, 0b1000_0001)]);
}

#[test]
fn lora_only_modes_rejected_for_fsk_ook() {
    let (mut radio, _state) = new_radio();
    assert!(matches!(
        radio.set_opmod(OperatingMode::Cad, Modulation::Fsk),
        Err(DriverError::InvalidArgument(_))
    ));
    assert!(matches!(
        radio.set_opmod(OperatingMode::RxSingle, Modulation::Ook),
        Err(DriverError::InvalidArgument(_))
    ));
}

#[test]
fn lora_tx_loads_fifo_and_dispatches_tx_done_once() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Lora).unwrap();

    let transmissions = Rc::new(Cell::new(0u32));
    let counter = transmissions.clone();
    radio.tx_set_callback(move || counter.set(counter.get() + 1));

    let payload: Vec<u8> = (0..=254).collect();
    radio.lora_tx_set_for_transmission(&payload).unwrap();

    assert_eq!(reg(&state, LORA_REG_FIFO_ADDR_PTR), 0x00);
    assert_eq!(reg(&state, LORA_REG_PAYLOAD_LENGTH), 255);
    assert_eq!(state.borrow().fifo_out, payload);
    // armed: TX mode in LoRa
    assert_eq!(reg(&state, REG_OP_MODE), 0b1000_0011);

    state.borrow_mut().registers[LORA_REG_IRQ_FLAGS as usize] = 0b0000_1000;
    radio.handle_interrupt().unwrap();
    assert_eq!(transmissions.get(), 1);

    // only the TX done flag was acknowledged
    let last_irq_write = state
        .borrow()
        .writes
        .iter()
        .rev()
        .find(|(addr, _)| *addr == LORA_REG_IRQ_FLAGS)
        .copied();
    assert_eq!(last_irq_write, Some((LORA_REG_IRQ_FLAGS, 0b0000_1000)));

    // once the flag is gone the callback stays quiet
    state.borrow_mut().registers[LORA_REG_IRQ_FLAGS as usize] = 0;
    radio.handle_interrupt().unwrap();
    assert_eq!(transmissions.get(), 1);
}

#[test]
fn lora_rx_reads_payload_in_order() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::RxContinuous, Modulation::Lora).unwrap();

    let received = Rc::new(Cell::new(false));
    let flag = received.clone();
    radio.rx_set_callback(move || flag.set(true));

    let payload: Vec<u8> = (0..=254).collect();
    {
        let mut state = state.borrow_mut();
        state.fifo_in = payload.clone();
        state.registers[LORA_REG_IRQ_FLAGS as usize] = 0b0100_0000;
        state.registers[LORA_REG_RX_NB_BYTES as usize] = 255;
    }
    radio.handle_interrupt().unwrap();
    assert!(received.get());
    assert_eq!(radio.lora_rx_read_payload().unwrap(), payload.as_slice());

    // implicit header overrides the received-bytes register
    radio
        .lora_set_implicit_header(Some(ImplicitHeader {
            coding_rate: CodingRate::CR4_5,
            enable_crc: true,
            length: 2,
        }))
        .unwrap();
    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_1), 0b0000_0011);
    assert_eq!(reg(&state, LORA_REG_PAYLOAD_LENGTH), 2);
    assert_eq!(reg(&state, LORA_REG_MODEM_CONFIG_2), 0b0000_0100);

    state.borrow_mut().fifo_in = vec![0xCA, 0xFE];
    assert_eq!(radio.lora_rx_read_payload().unwrap(), &[0xCA, 0xFE]);
}

#[test]
fn cad_events_report_detection() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Lora).unwrap();

    let outcome = Rc::new(Cell::new(None::<bool>));
    let sink = outcome.clone();
    radio.cad_set_callback(move |detected| sink.set(Some(detected)));

    state.borrow_mut().registers[LORA_REG_IRQ_FLAGS as usize] = 0b0000_0101;
    radio.handle_interrupt().unwrap();
    assert_eq!(outcome.get(), Some(true));

    state.borrow_mut().registers[LORA_REG_IRQ_FLAGS as usize] = 0b0000_0100;
    radio.handle_interrupt().unwrap();
    assert_eq!(outcome.get(), Some(false));
}

#[test]
fn fsk_ook_configuration_writes_datasheet_values() {
    let (mut radio, state) = new_radio();

    radio.set_opmod(OperatingMode::Sleep, Modulation::Fsk).unwrap();
    assert_eq!(reg(&state, REG_OP_MODE), 0b0000_0000);

    radio.set_frequency(437_200_012).unwrap();
    assert_eq!(reg(&state, REG_FRF_MSB), 0x6D);
    assert_eq!(reg(&state, REG_FRF_MID), 0x4C);
    assert_eq!(reg(&state, REG_FRF_LSB), 0xCD);

    radio.rx_set_lna_gain(LnaGain::G4).unwrap();

    radio.fsk_ook_set_bitrate(4800.0).unwrap();
    assert_eq!(reg(&state, FSK_REG_BITRATE_MSB), 0x1A);
    assert_eq!(reg(&state, FSK_REG_BITRATE_LSB), 0x0A);
    assert_eq!(reg(&state, FSK_REG_BITRATE_FRAC), 0x0A);

    radio.fsk_set_fdev(5000.0).unwrap();
    assert_eq!(reg(&state, FSK_REG_FDEV_MSB), 0x00);
    assert_eq!(reg(&state, FSK_REG_FDEV_LSB), 0x51);

    radio.fsk_ook_set_syncword(&[0x12, 0xAD]).unwrap();
    assert_eq!(reg(&state, FSK_REG_SYNC_VALUE_1), 0x12);
    assert_eq!(reg(&state, FSK_REG_SYNC_VALUE_1 + 1), 0xAD);

    radio.fsk_ook_set_packet_encoding(PacketEncoding::Scrambled).unwrap();
    radio.fsk_ook_set_crc(CrcType::Ccitt).unwrap();
    radio
        .fsk_ook_set_address_filtering(AddressFiltering::NodeAndBroadcast, 0x11, 0x12)
        .unwrap();
    assert_eq!(reg(&state, FSK_REG_NODE_ADRS), 0x11);
    assert_eq!(reg(&state, FSK_REG_BROADCAST_ADRS), 0x12);

    radio.fsk_ook_set_packet_format(PacketFormat::Variable, 255).unwrap();
    assert_eq!(reg(&state, FSK_REG_PACKET_CONFIG_2), 0b0000_0000);
    assert_eq!(reg(&state, FSK_REG_PAYLOAD_LENGTH), 0xFF);

    radio.fsk_set_data_shaping(FskDataShaping::Bt0_5, PaRamp::Ramp40Us).unwrap();
    radio.fsk_ook_set_preamble_type(PreambleType::Preamble55).unwrap();
    radio.fsk_ook_rx_set_afc_auto(true).unwrap();

    radio.fsk_ook_rx_set_afc_bandwidth(20_000.0).unwrap();
    assert_eq!(reg(&state, FSK_REG_AFC_BW), 0x14);

    radio.fsk_ook_rx_set_bandwidth(5_000.0).unwrap();
    assert_eq!(reg(&state, FSK_REG_RX_BW), 0x16);

    radio.fsk_ook_rx_set_rssi_config(RssiSmoothing::Samples8, 0).unwrap();
    radio.fsk_ook_rx_set_collision_restart(true, 10).unwrap();
    assert_eq!(reg(&state, FSK_REG_RSSI_COLLISION), 10);

    radio.fsk_ook_rx_set_trigger(RxTrigger::RssiAndPreamble).unwrap();
    radio.fsk_ook_rx_set_preamble_detector(true, 2, 0x0A).unwrap();
    radio
        .ook_rx_set_peak_mode(OokPeakThreshStep::Db0_5, 0x0C, OokPeakThreshDec::OncePerChip)
        .unwrap();

    assert_eq!(reg(&state, FSK_REG_RX_CONFIG), 0b1001_0111);
    assert_eq!(reg(&state, REG_LNA), 0b1000_0000);
    assert_eq!(reg(&state, FSK_REG_PACKET_CONFIG_1), 0b1101_0100);
    assert_eq!(reg(&state, FSK_REG_SYNC_CONFIG), 0b0011_0001);
    assert_eq!(reg(&state, REG_PA_RAMP), 0b0100_1001);
    assert_eq!(reg(&state, FSK_REG_RSSI_CONFIG), 0b0000_0010);
    assert_eq!(reg(&state, FSK_REG_PREAMBLE_DETECT), 0b1010_1010);

    radio.ook_set_data_shaping(OokDataShaping::BitRate, PaRamp::Ramp40Us).unwrap();
    assert_eq!(reg(&state, REG_PA_RAMP), 0b0010_1001);

    radio.ook_rx_set_fixed_mode(0x11).unwrap();
    assert_eq!(reg(&state, FSK_REG_OOK_PEAK), 0b0000_0000);
    assert_eq!(reg(&state, FSK_REG_OOK_FIX), 0x11);

    radio
        .ook_rx_set_avg_mode(OokAverageOffset::Db2, OokAverageThreshFilt::ChipRate4Pi)
        .unwrap();
    assert_eq!(reg(&state, FSK_REG_OOK_PEAK), 0b0001_0000);
    assert_eq!(reg(&state, FSK_REG_OOK_AVG), 0b0000_0110);

    {
        let mut state = state.borrow_mut();
        state.registers[FSK_REG_FEI_MSB as usize] = 0xFF;
        state.registers[FSK_REG_FEI_LSB as usize] = 0xF0;
    }
    assert_eq!(radio.rx_get_frequency_error().unwrap(), -976);
}

#[test]
fn fsk_rssi_latches_on_preamble_detect() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Fsk).unwrap();
    assert!(matches!(radio.rx_get_packet_rssi(), Err(DriverError::NotFound)));

    radio.set_opmod(OperatingMode::RxContinuous, Modulation::Fsk).unwrap();
    assert_eq!(reg(&state, REG_DIO_MAPPING_2), 0b1100_0000);

    {
        let mut state = state.borrow_mut();
        state.registers[FSK_REG_IRQ_FLAGS_1 as usize] = 0b0000_0010;
        state.registers[FSK_REG_RSSI_VALUE as usize] = 30;
    }
    radio.handle_interrupt().unwrap();
    assert_eq!(radio.rx_get_packet_rssi().unwrap(), -15);

    // re-arming the receiver invalidates the measurement
    radio.set_opmod(OperatingMode::RxContinuous, Modulation::Fsk).unwrap();
    assert!(matches!(radio.rx_get_packet_rssi(), Err(DriverError::NotFound)));
}

#[test]
fn fsk_packet_events_dispatch_callbacks() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Fsk).unwrap();

    let sent = Rc::new(Cell::new(false));
    let received = Rc::new(Cell::new(false));
    let sent_flag = sent.clone();
    let received_flag = received.clone();
    radio.tx_set_callback(move || sent_flag.set(true));
    radio.rx_set_callback(move || received_flag.set(true));

    state.borrow_mut().registers[FSK_REG_IRQ_FLAGS_2 as usize] = 0b0000_1000;
    radio.handle_interrupt().unwrap();
    assert!(sent.get());
    assert!(!received.get());

    state.borrow_mut().registers[FSK_REG_IRQ_FLAGS_2 as usize] = 0b0000_0100;
    radio.handle_interrupt().unwrap();
    assert!(received.get());
}

#[test]
fn oversized_payload_rejected_before_any_write() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Lora).unwrap();
    let writes_before = state.borrow().writes.len();

    let payload = vec![0u8; 256];
    assert!(matches!(
        radio.lora_tx_set_for_transmission(&payload),
        Err(DriverError::InvalidArgument(_))
    ));
    assert_eq!(state.borrow().writes.len(), writes_before);
    assert!(state.borrow().fifo_out.is_empty());
}

#[test]
fn unrepresentable_bandwidth_rejected() {
    let (mut radio, _state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Fsk).unwrap();
    assert!(matches!(
        radio.fsk_ook_rx_set_bandwidth(300_000.0),
        Err(DriverError::InvalidArgument(_))
    ));
}

#[test]
fn fsk_rssi_unavailable_outside_rx_mode() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::RxContinuous, Modulation::Fsk).unwrap();

    {
        let mut state = state.borrow_mut();
        state.registers[FSK_REG_IRQ_FLAGS_1 as usize] = 0b0000_0010;
        state.registers[FSK_REG_RSSI_VALUE as usize] = 30;
    }
    radio.handle_interrupt().unwrap();
    assert_eq!(radio.rx_get_packet_rssi().unwrap(), -15);

    // leaving the receive mode invalidates the measurement for the query
    radio.set_opmod(OperatingMode::Standby, Modulation::Fsk).unwrap();
    assert!(matches!(radio.rx_get_packet_rssi(), Err(DriverError::NotFound)));
    radio.set_opmod(OperatingMode::Sleep, Modulation::Fsk).unwrap();
    assert!(matches!(radio.rx_get_packet_rssi(), Err(DriverError::NotFound)));
}

#[test]
fn cross_modulation_configuration_rejected() {
    let (mut radio, state) = new_radio();

    radio.set_opmod(OperatingMode::Standby, Modulation::Lora).unwrap();
    let writes_before = state.borrow().writes.len();
    assert!(matches!(
        radio.fsk_ook_set_bitrate(4800.0),
        Err(DriverError::InvalidArgument(_))
    ));
    assert!(matches!(
        radio.fsk_ook_rx_set_trigger(RxTrigger::Rssi),
        Err(DriverError::InvalidArgument(_))
    ));
    assert_eq!(state.borrow().writes.len(), writes_before);

    radio.set_opmod(OperatingMode::Standby, Modulation::Fsk).unwrap();
    let writes_before = state.borrow().writes.len();
    assert!(matches!(
        radio.lora_set_bandwidth(Bandwidth::BW125),
        Err(DriverError::InvalidArgument(_))
    ));
    assert!(matches!(
        radio.lora_set_syncword(18),
        Err(DriverError::InvalidArgument(_))
    ));
    assert_eq!(state.borrow().writes.len(), writes_before);
}

#[test]
fn understocked_mock_fifo_surfaces_as_bus_error() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::RxContinuous, Modulation::Lora).unwrap();
    state.borrow_mut().registers[LORA_REG_RX_NB_BYTES as usize] = 4;
    assert!(matches!(
        radio.lora_rx_read_payload(),
        Err(DriverError::Hal(HalError::Spi))
    ));
}

#[test]
fn callback_registration_replaces_previous() {
    let (mut radio, state) = new_radio();
    radio.set_opmod(OperatingMode::Standby, Modulation::Lora).unwrap();

    let first = Rc::new(Cell::new(0u32));
    let second = Rc::new(Cell::new(0u32));
    let first_counter = first.clone();
    let second_counter = second.clone();
    radio.tx_set_callback(move || first_counter.set(first_counter.get() + 1));
    radio.tx_set_callback(move || second_counter.set(second_counter.get() + 1));

    state.borrow_mut().registers[LORA_REG_IRQ_FLAGS as usize] = 0b0000_1000;
    radio.handle_interrupt().unwrap();
    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}
