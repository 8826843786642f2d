use super::schema::{FieldDescriptor as F, Transform};

const MV10: Transform = Transform::linear(10, 0);
const MA10: Transform = Transform::linear(10, 0);
const MA40: Transform = Transform::linear(40, 0);

/// Writable configuration fields, in register order
pub static FIELDS: &[F] = &[
    // REG00 Minimal System Voltage
    F::scaled("VSYSMIN_5_0", 0x00, 0, 6, Transform::linear(250, 2500), 2500, 16000),
    // REG01 Charge Voltage Limit
    F::word("VREG_10_0", 0x01, 11, MV10, 3000, 18800),
    // REG03 Charge Current Limit
    F::word("ICHG_8_0", 0x03, 9, MA10, 50, 3000),
    // REG05 Input Voltage Limit
    F::scaled("VINDPM_7_0", 0x05, 0, 8, Transform::linear(100, 0), 3600, 22000),
    // REG06 Input Current Limit
    F::word("IINDPM_8_0", 0x06, 9, MA10, 100, 3300),
    // REG08 Precharge Control
    F::bits("VBAT_LOWV_1_0", 0x08, 6, 2),
    F::scaled("IPRECHG_5_0", 0x08, 0, 6, MA40, 40, 2000),
    // REG09 Termination Control
    // Writing 1 is the only reset command
    F::flag("REG_RST", 0x09, 6).factory_reset().range(1, 1),
    F::flag("STOP_WD_CHG", 0x09, 5),
    F::scaled("ITERM_4_0", 0x09, 0, 5, MA40, 40, 1000),
    // REG0A Re-charge Control
    F::scaled("CELL_1_0", 0x0A, 6, 2, Transform::linear(1, 1), 1, 4),
    F::bits("TRECHG_1_0", 0x0A, 4, 2),
    F::scaled("VRECHG_3_0", 0x0A, 0, 4, Transform::linear(50, 50), 50, 800),
    // REG0B VOTG regulation
    F::word("VOTG_10_0", 0x0B, 11, Transform::linear(10, 2800), 2800, 22000),
    // REG0D IOTG regulation
    F::flag("PRECHG_TMR", 0x0D, 7),
    F::scaled("IOTG_6_0", 0x0D, 0, 7, MA40, 160, 3360),
    // REG0E Timer Control
    F::bits("TOPOFF_TMR_1_0", 0x0E, 6, 2),
    F::flag("EN_TRICHG_TMR", 0x0E, 5),
    F::flag("EN_PRECHG_TMR", 0x0E, 4),
    F::flag("EN_CHG_TMR", 0x0E, 3),
    F::bits("CHG_TMR_1_0", 0x0E, 1, 2),
    F::flag("TMR2X_EN", 0x0E, 0),
    // REG0F Charger Control 0
    F::flag("EN_AUTO_IBATDIS", 0x0F, 7),
    F::flag("FORCE_IBATDIS", 0x0F, 6).transient(),
    F::flag("EN_CHG", 0x0F, 5),
    F::flag("EN_ICO", 0x0F, 4),
    F::flag("FORCE_ICO", 0x0F, 3).transient(),
    F::flag("EN_HIZ", 0x0F, 2),
    F::flag("EN_TERM", 0x0F, 1),
    // REG10 Charger Control 1
    F::bits("VAC_OVP_1_0", 0x10, 4, 2),
    F::flag("WD_RST", 0x10, 3).transient(),
    F::bits("WATCHDOG_2_0", 0x10, 0, 3),
    // REG11 Charger Control 2
    F::flag("FORCE_INDET", 0x11, 7).transient(),
    F::flag("AUTO_INDET_EN", 0x11, 6),
    F::flag("EN_12V", 0x11, 5),
    F::flag("EN_9V", 0x11, 4),
    F::flag("HVDCP_EN", 0x11, 3),
    F::bits("SDRV_CTRL_1_0", 0x11, 1, 2),
    F::flag("SDRV_DLY", 0x11, 0),
    // REG12 Charger Control 3
    F::flag("DIS_ACDRV", 0x12, 7),
    F::flag("EN_OTG", 0x12, 6),
    F::flag("PFM_OTG_DIS", 0x12, 5),
    F::flag("PFM_FWD_DIS", 0x12, 4),
    F::flag("WKUP_DLY", 0x12, 3),
    F::flag("DIS_LDO", 0x12, 2),
    F::flag("DIS_OTG_OOA", 0x12, 1),
    F::flag("DIS_FWD_OOA", 0x12, 0),
    // REG13 Charger Control 4
    F::flag("EN_ACDRV2", 0x13, 7),
    F::flag("EN_ACDRV1", 0x13, 6),
    F::flag("PWM_FREQ", 0x13, 5),
    F::flag("DIS_STAT", 0x13, 4),
    F::flag("DIS_VSYS_SHORT", 0x13, 3),
    F::flag("DIS_VOTG_UVP", 0x13, 2),
    F::flag("FORCE_VINDPM_DET", 0x13, 1).transient(),
    F::flag("EN_IBUS_OCP", 0x13, 0),
    // REG14 Charger Control 5
    F::flag("SFET_PRESENT", 0x14, 7),
    F::flag("EN_IBAT", 0x14, 5),
    F::bits("IBAT_REG_1_0", 0x14, 3, 2),
    F::flag("EN_IINDPM", 0x14, 2),
    F::flag("EN_EXTILIM", 0x14, 1),
    F::flag("EN_BATOC", 0x14, 0),
    // REG15 MPPT Control
    F::bits("VOC_PCT_2_0", 0x15, 5, 3),
    F::bits("VOC_DLY_1_0", 0x15, 3, 2),
    F::bits("VOC_RATE_1_0", 0x15, 1, 2),
    F::flag("EN_MPPT", 0x15, 0),
    // REG16 Temperature Control
    F::bits("TREG_1_0", 0x16, 6, 2),
    F::bits("TSHUT_1_0", 0x16, 4, 2),
    F::flag("VBUS_PD_EN", 0x16, 3),
    F::flag("VAC1_PD_EN", 0x16, 2),
    F::flag("VAC2_PD_EN", 0x16, 1),
    // REG17 NTC Control 0
    F::bits("JEITA_VSET_2_0", 0x17, 5, 3),
    F::bits("JEITA_ISETH_1_0", 0x17, 3, 2),
    F::bits("JEITA_ISETC_1_0", 0x17, 1, 2),
    // REG18 NTC Control 1
    F::bits("TS_COOL_1_0", 0x18, 6, 2),
    F::bits("TS_WARM_1_0", 0x18, 4, 2),
    F::bits("BHOT_1_0", 0x18, 2, 2),
    F::flag("BCOLD", 0x18, 1),
    F::flag("TS_IGNORE", 0x18, 0),
    // REG28 Charger Mask 0
    F::flag("IINDPM_MASK", 0x28, 7),
    F::flag("VINDPM_MASK", 0x28, 6),
    F::flag("WD_MASK", 0x28, 5),
    F::flag("POORSRC_MASK", 0x28, 4),
    F::flag("PG_MASK", 0x28, 3),
    F::flag("AC2_PRESENT_MASK", 0x28, 2),
    F::flag("AC1_PRESENT_MASK", 0x28, 1),
    F::flag("VBUS_PRESENT_MASK", 0x28, 0),
    // REG29 Charger Mask 1, bit 5 reserved
    F::flag("CHG_MASK", 0x29, 7),
    F::flag("ICO_MASK", 0x29, 6),
    F::flag("VBUS_MASK", 0x29, 4),
    F::flag("TREG_MASK", 0x29, 2),
    F::flag("VBAT_PRESENT_MASK", 0x29, 1),
    F::flag("BC1_2_DONE_MASK", 0x29, 0),
    // REG2A Charger Mask 2
    F::flag("DPDM_DONE_MASK", 0x2A, 6),
    F::flag("ADC_DONE_MASK", 0x2A, 5),
    F::flag("VSYS_MASK", 0x2A, 4),
    F::flag("CHG_TMR_MASK", 0x2A, 3),
    F::flag("TRICHG_TMR_MASK", 0x2A, 2),
    F::flag("PRECHG_TMR_MASK", 0x2A, 1),
    F::flag("TOPOFF_TMR_MASK", 0x2A, 0),
    // REG2B Charger Mask 3
    F::flag("VBATOTG_LOW_MASK", 0x2B, 4),
    F::flag("TS_COLD_MASK", 0x2B, 3),
    F::flag("TS_COOL_MASK", 0x2B, 2),
    F::flag("TS_WARM_MASK", 0x2B, 1),
    F::flag("TS_HOT_MASK", 0x2B, 0),
    // REG2C FAULT Mask 0
    F::flag("IBAT_REG_MASK", 0x2C, 7),
    F::flag("VBUS_OVP_MASK", 0x2C, 6),
    F::flag("VBAT_OVP_MASK", 0x2C, 5),
    F::flag("IBUS_OCP_MASK", 0x2C, 4),
    F::flag("IBAT_OCP_MASK", 0x2C, 3),
    F::flag("CONV_OCP_MASK", 0x2C, 2),
    F::flag("VAC2_OVP_MASK", 0x2C, 1),
    F::flag("VAC1_OVP_MASK", 0x2C, 0),
    // REG2D FAULT Mask 1
    F::flag("VSYS_SHORT_MASK", 0x2D, 7),
    F::flag("VSYS_OVP_MASK", 0x2D, 6),
    F::flag("OTG_OVP_MASK", 0x2D, 5),
    F::flag("OTG_UVP_MASK", 0x2D, 4),
    F::flag("TSHUT_MASK", 0x2D, 2),
    // REG2E ADC Control
    F::flag("ADC_EN", 0x2E, 7),
    F::flag("ADC_RATE", 0x2E, 6),
    F::bits("ADC_SAMPLE_1_0", 0x2E, 4, 2),
    F::flag("ADC_AVG", 0x2E, 3),
    F::flag("ADC_AVG_INIT", 0x2E, 2),
    // REG2F ADC Function Disable 0
    F::flag("IBUS_ADC_DIS", 0x2F, 7),
    F::flag("IBAT_ADC_DIS", 0x2F, 6),
    F::flag("VBUS_ADC_DIS", 0x2F, 5),
    F::flag("VBAT_ADC_DIS", 0x2F, 4),
    F::flag("VSYS_ADC_DIS", 0x2F, 3),
    F::flag("TS_ADC_DIS", 0x2F, 2),
    F::flag("TDIE_ADC_DIS", 0x2F, 1),
    // REG30 ADC Function Disable 1
    F::flag("DP_ADC_DIS", 0x30, 7),
    F::flag("DM_ADC_DIS", 0x30, 6),
    F::flag("VAC2_ADC_DIS", 0x30, 5),
    F::flag("VAC1_ADC_DIS", 0x30, 4),
    // REG47 DPDM Driver
    F::bits("DPLUS_DAC_2_0", 0x47, 5, 3),
    F::bits("DMINUS_DAC_2_0", 0x47, 2, 3),
];

const RAW16: Transform = Transform::IDENTITY;

/// Read-only status, ADC and identification fields
pub static STATUS_FIELDS: &[F] = &[
    // REG19 ICO current limit, mA
    F::word("ICO_ILIM", 0x19, 9, MA10, 0, 5110),
    // REG1B Charger Status 0
    F::flag("IINDPM_STAT", 0x1B, 7),
    F::flag("VINDPM_STAT", 0x1B, 6),
    F::flag("WD_STAT", 0x1B, 5),
    F::flag("PG_STAT", 0x1B, 3),
    F::flag("AC2_PRESENT_STAT", 0x1B, 2),
    F::flag("AC1_PRESENT_STAT", 0x1B, 1),
    F::flag("VBUS_PRESENT_STAT", 0x1B, 0),
    // REG1C Charger Status 1
    F::bits("CHG_STAT_2_0", 0x1C, 5, 3),
    F::bits("VBUS_STAT_3_0", 0x1C, 1, 4),
    F::flag("BC1_2_DONE_STAT", 0x1C, 0),
    // REG1D Charger Status 2
    F::bits("ICO_STAT_1_0", 0x1D, 6, 2),
    F::flag("TREG_STAT", 0x1D, 2),
    F::flag("DPDM_STAT", 0x1D, 1),
    F::flag("VBAT_PRESENT_STAT", 0x1D, 0),
    // REG1E Charger Status 3
    F::flag("ACRB2_STAT", 0x1E, 7),
    F::flag("ACRB1_STAT", 0x1E, 6),
    F::flag("ADC_DONE_STAT", 0x1E, 5),
    F::flag("VSYS_STAT", 0x1E, 4),
    F::flag("CHG_TMR_STAT", 0x1E, 3),
    F::flag("TRICHG_TMR_STAT", 0x1E, 2),
    F::flag("PRECHG_TMR_STAT", 0x1E, 1),
    // REG1F Charger Status 4
    F::flag("VBATOTG_LOW_STAT", 0x1F, 4),
    F::flag("TS_COLD_STAT", 0x1F, 3),
    F::flag("TS_COOL_STAT", 0x1F, 2),
    F::flag("TS_WARM_STAT", 0x1F, 1),
    F::flag("TS_HOT_STAT", 0x1F, 0),
    // REG20 FAULT Status 0
    F::flag("IBAT_REG_STAT", 0x20, 7),
    F::flag("VBUS_OVP_STAT", 0x20, 6),
    F::flag("VBAT_OVP_STAT", 0x20, 5),
    F::flag("IBUS_OCP_STAT", 0x20, 4),
    F::flag("IBAT_OCP_STAT", 0x20, 3),
    F::flag("CONV_OCP_STAT", 0x20, 2),
    F::flag("VAC2_OVP_STAT", 0x20, 1),
    F::flag("VAC1_OVP_STAT", 0x20, 0),
    // REG21 FAULT Status 1
    F::flag("VSYS_SHORT_STAT", 0x21, 7),
    F::flag("VSYS_OVP_STAT", 0x21, 6),
    F::flag("OTG_OVP_STAT", 0x21, 5),
    F::flag("OTG_UVP_STAT", 0x21, 4),
    F::flag("TSHUT_STAT", 0x21, 2),
    // REG31..REG46 ADC results
    F::word("IBUS_ADC", 0x31, 16, RAW16, 0, 0).signed(),
    F::word("IBAT_ADC", 0x33, 16, RAW16, 0, 0).signed(),
    F::word("VBUS_ADC", 0x35, 16, RAW16, 0, 65535),
    F::word("VAC1_ADC", 0x37, 16, RAW16, 0, 65535),
    F::word("VAC2_ADC", 0x39, 16, RAW16, 0, 65535),
    F::word("VBAT_ADC", 0x3B, 16, RAW16, 0, 65535),
    F::word("VSYS_ADC", 0x3D, 16, RAW16, 0, 65535),
    // 0.01 % of REGN per unit
    F::word("TS_ADC", 0x3F, 16, Transform::ratio(625, 64, 0), 0, 639_990),
    // 0.1 degC per unit
    F::word("TDIE_ADC", 0x41, 16, Transform::linear(5, 0), 0, 0).signed(),
    F::word("DPLUS_ADC", 0x43, 16, RAW16, 0, 65535),
    F::word("DMINUS_ADC", 0x45, 16, RAW16, 0, 65535),
    // REG48 Part Information
    F::bits("PN_2_0", 0x48, 3, 3),
    F::bits("DEV_REV_2_0", 0x48, 0, 3),
];
