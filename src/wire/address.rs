use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6};

use super::{Readable, StreamInput, StreamOutput, Writeable};
use crate::error::DecodeError;
use crate::types::TransportAddress;

const DUMMY_FAMILY: i16 = 0;
const INET_FAMILY: i16 = 1;
const LOCAL_FAMILY: i16 = 2;

impl Writeable for TransportAddress {
    fn write_to(&self, out: &mut StreamOutput) {
        match self {
            TransportAddress::Dummy => out.write_i16(DUMMY_FAMILY),
            TransportAddress::Inet { addr } => {
                out.write_i16(INET_FAMILY);
                match addr {
                    SocketAddr::V4(v4) => {
                        out.write_u8(4);
                        out.write_bytes(&v4.ip().octets());
                    }
                    SocketAddr::V6(v6) => {
                        out.write_u8(16);
                        out.write_bytes(&v6.ip().octets());
                        out.write_i32(v6.scope_id() as i32);
                    }
                }
                out.write_i32(i32::from(addr.port()));
            }
            TransportAddress::Local { id } => {
                out.write_i16(LOCAL_FAMILY);
                out.write_string(id);
            }
        }
    }
}

impl Readable for TransportAddress {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        match input.read_i16()? {
            DUMMY_FAMILY => Ok(TransportAddress::Dummy),
            INET_FAMILY => read_inet(input),
            LOCAL_FAMILY => Ok(TransportAddress::local(input.read_string()?)),
            other => Err(DecodeError::UnknownAddressFamily(other)),
        }
    }
}

fn read_inet(input: &mut StreamInput<'_>) -> Result<TransportAddress, DecodeError> {
    let len = input.read_u8()?;
    let addr = match len {
        4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(input.read_bytes(4)?);
            let ip = IpAddr::V4(Ipv4Addr::from(octets));
            SocketAddr::new(ip, read_port(input)?)
        }
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(input.read_bytes(16)?);
            let scope_id = input.read_i32()? as u32;
            let port = read_port(input)?;
            SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::from(octets), port, 0, scope_id))
        }
        other => return Err(DecodeError::InvalidAddressLength(other)),
    };
    Ok(TransportAddress::inet(addr))
}

fn read_port(input: &mut StreamInput<'_>) -> Result<u16, DecodeError> {
    let port = input.read_i32()?;
    u16::try_from(port).map_err(|_| DecodeError::InvalidPort(port))
}
