//! Embedded reference data
//!
//! - A default cost-of-insurance table (per 1,000 of net amount at risk)
//!   built from the IAM 2012 basic table, used when no rate file is given.
//! - Two participating-product illustrations used by the leverage
//!   calculators. Their values are totals per the illustration's base annual
//!   premium and scale linearly with the annual deposit.

use super::{GuaranteedSchedule, LoanLimitSchedule, RateRow, RateTable};
use crate::projection::Horizon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default COI rate table (per mille), ages 0-120
pub fn default_coi_table() -> RateTable {
    RateTable::from_rows(IAM_2012_PER_MILLE.iter().enumerate().map(|(age, &(male, female))| {
        RateRow {
            age: age as u8,
            male_rate: male,
            female_rate: female,
        }
    }))
}

/// Participating-product illustrations shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceProduct {
    /// Whole-life participating policy, 20 deposit years, illustrated to age 85
    Pai,
    /// Six-pay participating policy (37-year-old female), illustrated for 50 years
    Iat2,
}

impl ReferenceProduct {
    /// Annual premium the illustration values correspond to
    pub fn base_premium(&self) -> f64 {
        match self {
            ReferenceProduct::Pai => 120_003.0,
            ReferenceProduct::Iat2 => 120_918.0,
        }
    }

    /// Number of years deposits are made
    pub fn deposit_years(&self) -> u32 {
        match self {
            ReferenceProduct::Pai => 20,
            ReferenceProduct::Iat2 => 6,
        }
    }

    /// Illustrated cash values and death benefits at the base premium
    pub fn schedule(&self) -> GuaranteedSchedule {
        match self {
            ReferenceProduct::Pai => {
                GuaranteedSchedule::new(PAI_CASH_VALUES.to_vec(), PAI_DEATH_BENEFITS.to_vec())
            }
            ReferenceProduct::Iat2 => {
                GuaranteedSchedule::new(IAT2_CASH_VALUES.to_vec(), IAT2_DEATH_BENEFITS.to_vec())
            }
        }
    }

    /// Loan-limit schedule of the product
    pub fn loan_limits(&self) -> LoanLimitSchedule {
        match self {
            ReferenceProduct::Pai => LoanLimitSchedule::pai(),
            ReferenceProduct::Iat2 => LoanLimitSchedule::iat2(),
        }
    }

    /// Illustration horizon for an issue age
    pub fn horizon(&self, issue_age: u8) -> Horizon {
        match self {
            // Last illustrated year ends at age 85
            ReferenceProduct::Pai => Horizon::PolicyYears(85u32.saturating_sub(issue_age as u32)),
            ReferenceProduct::Iat2 => Horizon::PolicyYears(50),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceProduct::Pai => "pai",
            ReferenceProduct::Iat2 => "iat2",
        }
    }
}

impl fmt::Display for ReferenceProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceProduct {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pai" => Ok(ReferenceProduct::Pai),
            "iat2" => Ok(ReferenceProduct::Iat2),
            other => Err(format!("unknown reference product: {}", other)),
        }
    }
}

const PAI_CASH_VALUES: [f64; 86] = [
    75568.0, 151906.0, 229013.0, 306899.0, 368190.0, 429482.0, 549969.0, 679495.0,
    815609.0, 960677.0, 1112453.0, 1273472.0, 1441892.0, 1619008.0, 1804891.0, 1999194.0,
    2170489.0, 2345219.0, 2525180.0, 2708683.0, 2796023.0, 2871780.0, 2949471.0, 3030006.0,
    3111221.0, 3194976.0, 3280911.0, 3369035.0, 3459379.0, 3552969.0, 3646561.0, 3744237.0,
    3843884.0, 3945018.0, 4049162.0, 4155962.0, 4264024.0, 4375249.0, 4489180.0, 4605868.0,
    4722041.0, 4843080.0, 4964110.0, 5088924.0, 5215376.0, 5344037.0, 5473126.0, 5604778.0,
    5738463.0, 5874202.0, 6011861.0, 6151926.0, 6292620.0, 6434379.0, 6578609.0, 6723359.0,
    6870598.0, 7019910.0, 7168168.0, 7319472.0, 7472919.0, 7626897.0, 7781843.0, 7937799.0,
    8096541.0, 8255893.0, 8418253.0, 8583316.0, 8749459.0, 8921196.0, 9097991.0, 9280402.0,
    9471102.0, 9674587.0, 9895415.0, 10142999.0, 10414816.0, 10696778.0, 10992809.0, 11304075.0,
    11632752.0, 11979388.0, 12355444.0, 12765735.0, 13233318.0, 13766422.0,
];

const PAI_DEATH_BENEFITS: [f64; 86] = [
    170000.0, 340185.0, 510558.0, 681120.0, 858687.0, 6849302.0, 6807176.0, 6772672.0,
    6745104.0, 6724209.0, 6710612.0, 6702492.0, 6701107.0, 6706363.0, 6718151.0, 6735241.0,
    6760773.0, 6791657.0, 6828419.0, 6871177.0, 6915181.0, 6946482.0, 6977752.0, 7009859.0,
    7042364.0, 7075362.0, 7109371.0, 7143494.0, 7178647.0, 7214892.0, 7250015.0, 7288018.0,
    7324779.0, 7363849.0, 7402672.0, 7442997.0, 7483378.0, 7525738.0, 7567382.0, 7611693.0,
    7655608.0, 7702077.0, 7747425.0, 7796685.0, 7845305.0, 7895147.0, 7947001.0, 8000527.0,
    8055223.0, 8111151.0, 8168164.0, 8226834.0, 8286878.0, 8350332.0, 8414295.0, 8481377.0,
    8549089.0, 8618573.0, 8691615.0, 8766065.0, 8842680.0, 8923339.0, 9005279.0, 9090404.0,
    9178873.0, 9270456.0, 9365880.0, 9463047.0, 9566182.0, 9672209.0, 9782518.0, 9897691.0,
    10018324.0, 10142410.0, 10271878.0, 10408931.0, 10597577.0, 10866775.0, 11149518.0, 11446957.0,
    11761249.0, 12095401.0, 12455963.0, 12847598.0, 13280185.0, 13766422.0,
];

const IAT2_CASH_VALUES: [f64; 74] = [
    57241.0, 161215.0, 280011.0, 414148.0, 563983.0, 722004.0, 745788.0, 762729.0,
    780050.0, 797711.0, 815762.0, 834207.0, 853051.0, 872256.0, 892170.0, 912497.0,
    933250.0, 954474.0, 976139.0, 998284.0, 1020880.0, 1043933.0, 1067496.0, 1091523.0,
    1116366.0, 1141780.0, 1167738.0, 1194193.0, 1221201.0, 1248731.0, 1276880.0, 1305516.0,
    1334739.0, 1364433.0, 1395712.0, 1427683.0, 1460369.0, 1493739.0, 1527863.0, 1562718.0,
    1598291.0, 1634634.0, 1671738.0, 1709575.0, 1748178.0, 1787558.0, 1827752.0, 1868643.0,
    1910310.0, 1952764.0, 1995964.0, 2039829.0, 2084438.0, 2129682.0, 2175900.0, 2222877.0,
    2270575.0, 2319052.0, 2368279.0, 2418279.0, 2468979.0, 2520481.0, 2572804.0, 2625837.0,
    2679680.0, 2734352.0, 2789925.0, 2846357.0, 2903802.0, 2962153.0, 3021701.0, 3082687.0,
    3146580.0, 3200603.0,
];

const IAT2_DEATH_BENEFITS: [f64; 74] = [
    126468.0, 321248.0, 525515.0, 734419.0, 829592.0, 1020884.0, 1042505.0, 1064500.0,
    1087000.0, 1109882.0, 1133237.0, 1157070.0, 1181428.0, 1206147.0, 1061997.0, 1085248.0,
    1108966.0, 1133198.0, 1157911.0, 1183148.0, 1208876.0, 1235103.0, 1261924.0, 1289210.0,
    1216901.0, 1244068.0, 1271740.0, 1299990.0, 1328795.0, 1358120.0, 1388107.0, 1418622.0,
    1449725.0, 1481299.0, 1419520.0, 1451866.0, 1484970.0, 1518800.0, 1553341.0, 1588614.0,
    1624646.0, 1661449.0, 1699012.0, 1737309.0, 1776371.0, 1816211.0, 1856864.0, 1898257.0,
    1940424.0, 1983338.0, 2027039.0, 2071405.0, 2116516.0, 2162260.0, 2192816.0, 2239250.0,
    2286321.0, 2334047.0, 2382480.0, 2431561.0, 2481342.0, 2531842.0, 2583120.0, 2635109.0,
    2687867.0, 2741411.0, 2795815.0, 2850993.0, 2907018.0, 2963907.0, 3021743.0, 3082687.0,
    3146580.0, 3200603.0,
];

/// IAM 2012 basic annual mortality per 1,000 by age 0-120, stored as (male, female)
const IAM_2012_PER_MILLE: [(f64, f64); 121] = [
    // Age 0-4
    (1.783, 1.801), (0.446, 0.45), (0.306, 0.287), (0.254, 0.199), (0.193, 0.152),
    // Age 5-9
    (0.186, 0.139), (0.184, 0.13), (0.177, 0.122), (0.159, 0.105), (0.143, 0.098),
    // Age 10-14
    (0.126, 0.094), (0.123, 0.096), (0.147, 0.105), (0.188, 0.12), (0.236, 0.146),
    // Age 15-19
    (0.282, 0.174), (0.325, 0.199), (0.364, 0.22), (0.399, 0.234), (0.43, 0.245),
    // Age 20-24
    (0.459, 0.253), (0.492, 0.26), (0.526, 0.266), (0.569, 0.272), (0.616, 0.275),
    // Age 25-29
    (0.669, 0.277), (0.728, 0.284), (0.764, 0.29), (0.789, 0.3), (0.808, 0.313),
    // Age 30-34
    (0.824, 0.333), (0.834, 0.357), (0.838, 0.375), (0.828, 0.39), (0.808, 0.405),
    // Age 35-39
    (0.789, 0.424), (0.783, 0.447), (0.8, 0.476), (0.837, 0.514), (0.889, 0.56),
    // Age 40-44
    (0.955, 0.613), (1.029, 0.667), (1.11, 0.723), (1.188, 0.774), (1.268, 0.823),
    // Age 45-49
    (1.355, 0.866), (1.464, 0.917), (1.615, 0.983), (1.808, 1.072), (2.032, 1.168),
    // Age 50-54
    (2.285, 1.29), (2.557, 1.453), (2.828, 1.622), (3.088, 1.792), (3.345, 1.972),
    // Age 55-59
    (3.616, 2.166), (3.922, 2.393), (4.272, 2.666), (4.681, 3.0), (5.146, 3.393),
    // Age 60-64
    (5.662, 3.844), (6.237, 4.352), (6.854, 4.899), (7.51, 5.482), (8.22, 6.118),
    // Age 65-69
    (9.007, 6.829), (9.497, 7.279), (10.085, 7.821), (10.787, 8.475), (11.625, 9.234),
    // Age 70-74
    (12.619, 10.083), (13.798, 11.011), (15.195, 12.03), (16.834, 13.154), (18.733, 14.415),
    // Age 75-79
    (20.905, 15.869), (23.367, 17.555), (26.155, 19.5), (29.306, 21.758), (32.858, 24.412),
    // Age 80-84
    (36.927, 27.579), (41.703, 31.501), (46.957, 36.122), (52.713, 41.477), (59.148, 47.589),
    // Age 85-89
    (66.505, 54.441), (75.015, 61.972), (84.823, 70.155), (95.987, 78.963), (108.482, 88.336),
    // Age 90-94
    (122.214, 98.197), (136.799, 108.323), (152.409, 119.188), (169.078, 131.334), (186.882, 145.521),
    // Age 95-99
    (205.844, 162.722), (219.247, 182.12), (238.612, 199.661), (258.341, 217.946), (278.219, 236.834),
    // Age 100-104
    (298.452, 256.357), (323.61, 283.802), (344.191, 304.716), (364.633, 325.819), (384.783, 346.936),
    // Age 105-109
    (400.0, 367.898), (400.0, 387.607), (400.0, 400.0), (400.0, 400.0), (400.0, 400.0),
    // Age 110-114
    (400.0, 400.0), (400.0, 400.0), (400.0, 400.0), (400.0, 400.0), (400.0, 400.0),
    // Age 115-119
    (400.0, 400.0), (400.0, 400.0), (400.0, 400.0), (400.0, 400.0), (400.0, 400.0),
    // Age 120
    (400.0, 400.0),
];
