pub mod pa_data_types {
    pub const PA_TGS_REQ: u32 = 1;
    pub const PA_ENC_TIMESTAMP: u32 = 2;
    pub const PA_ETYPE_INFO2: u32 = 19;
    /// [MS-SFU 2.2.1] PA-FOR-USER, the S4U2self payload.
    pub const PA_FOR_USER: u32 = 129;
    pub const PA_PAC_OPTIONS: u32 = 167;
}

pub mod error_codes {
    pub const KDC_ERR_C_PRINCIPAL_UNKNOWN: i32 = 6;
    pub const KDC_ERR_S_PRINCIPAL_UNKNOWN: i32 = 7;
    pub const KDC_ERR_POLICY: i32 = 12;
    pub const KDC_ERR_BADOPTION: i32 = 13;
    pub const KDC_ERR_ETYPE_NOSUPP: i32 = 14;
    pub const KRB_AP_ERR_TKT_EXPIRED: i32 = 32;
    pub const KRB_ERR_GENERIC: i32 = 60;
    pub const KDC_ERR_WRONG_REALM: i32 = 68;
}
