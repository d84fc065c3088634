bitflags::bitflags! {
    /// KDC options from [RFC 4120 5.4.1](https://www.rfc-editor.org/rfc/rfc4120.txt),
    /// plus the RFC 6806 CANONICALIZE bit and the MS-SFU CNAME-IN-ADDL-TKT bit.
    /// MSB-0 bit numbering over the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KdcOptions: u32 {
        const FORWARDABLE = 1 << 30;
        const FORWARDED = 1 << 29;
        const PROXIABLE = 1 << 28;
        const PROXY = 1 << 27;
        const ALLOW_POSTDATE = 1 << 26;
        const POSTDATED = 1 << 25;
        const RENEWABLE = 1 << 23;
        const CNAME_IN_ADDL_TKT = 1 << 17;
        const CANONICALIZE = 1 << 16;
        const RENEWABLE_OK = 1 << 4;
        const ENC_TKT_IN_SKEY = 1 << 3;
        const RENEW = 1 << 1;
        const VALIDATE = 1 << 0;
    }
}
